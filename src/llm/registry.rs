//! Model registry and startup configuration for the Gemini provider

use super::gemini::DEFAULT_API_BASE;
use super::models::{all_models, create_service, find_model};
use super::{LlmService, LoggingService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Model used when `GEMINI_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the LLM provider
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Default model ID
    pub model: Option<String>,
    /// API root override (gateways, local mocks)
    pub api_base: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: std::env::var("GEMINI_MODEL").ok(),
            api_base: std::env::var("GEMINI_API_BASE").ok(),
        }
    }

    fn model(&self) -> &str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
    }
}

/// Startup configuration failures. These halt the process before any
/// session exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Export it or add it to the service environment.")]
    MissingApiKey,
    #[error("Failed to initialize model {model}: {reason}")]
    ServiceInit { model: String, reason: String },
    #[error("TRIP_PLANNER_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let api_base = config.api_base();
        let default_model = config.model().to_string();

        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();
        let ids = all_models()
            .iter()
            .map(|m| m.id)
            .chain(std::iter::once(default_model.as_str()));
        for id in ids {
            if services.contains_key(id) {
                continue;
            }
            let service = create_service(id, api_key, api_base).map_err(|reason| {
                ConfigError::ServiceInit {
                    model: id.to_string(),
                    reason,
                }
            })?;
            services.insert(id.to_string(), Arc::new(LoggingService::new(service)));
        }

        Ok(Self {
            services,
            default_model,
        })
    }

    /// Build a registry around pre-made services
    #[cfg(test)]
    pub fn from_services(
        default_model: impl Into<String>,
        services: Vec<Arc<dyn LlmService>>,
    ) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|s| (s.model_id().to_string(), s))
                .collect(),
            default_model: default_model.into(),
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        self.available_models()
            .into_iter()
            .map(|id| {
                let def = find_model(&id);
                crate::api::ModelInfo {
                    description: def.map_or("Custom model", |d| d.description).to_string(),
                    context_window: def.map(|d| d.context_window),
                    id,
                }
            })
            .collect()
    }
}
