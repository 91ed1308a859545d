//! API request and response types

use crate::session::{SessionSnapshot, TravelStyle, TripProfile};
use serde::{Deserialize, Serialize};

/// Request to create a new session
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Model to use instead of the configured default
    #[serde(default)]
    pub model: Option<String>,
}

/// Response for session creation and retrieval
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to save the trip form
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub profile: TripProfile,
}

/// Response for actions handed to the session runtime
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Response for simple success
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Model information for the API
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<usize>,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Travel style option for the form
#[derive(Debug, Serialize)]
pub struct TravelStyleOption {
    pub value: TravelStyle,
    pub label: &'static str,
}

impl TravelStyleOption {
    pub fn all() -> Vec<Self> {
        TravelStyle::ALL
            .iter()
            .map(|&value| Self {
                value,
                label: value.label(),
            })
            .collect()
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
