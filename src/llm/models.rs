//! Known Gemini model definitions
//!
//! The configured model does not have to appear here; this list only feeds
//! the model picker and its descriptions.

use super::gemini::GeminiService;
use super::LlmService;
use std::sync::Arc;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Model ID as used in the Gemini API path (e.g., "gemini-2.5-flash")
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
}

/// Build a Gemini service for any model name
pub fn create_service(
    model: &str,
    api_key: &str,
    api_base: &str,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!("{model} requires GEMINI_API_KEY"));
    }
    let service =
        GeminiService::new(api_key.to_string(), model, api_base).map_err(|e| e.message)?;
    Ok(Arc::new(service))
}

/// Get all known model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-2.5-flash",
            description: "Gemini 2.5 Flash (fast, default)",
            context_window: 1_048_576,
        },
        ModelDef {
            id: "gemini-2.5-pro",
            description: "Gemini 2.5 Pro (most capable, slower)",
            context_window: 1_048_576,
        },
        ModelDef {
            id: "gemini-2.0-flash",
            description: "Gemini 2.0 Flash (previous generation)",
            context_window: 1_048_576,
        },
    ]
}

/// Look up a known model
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}
