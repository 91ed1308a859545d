//! Common types for LLM interactions

use super::LlmError;
use futures::stream::BoxStream;

/// LLM request: one system instruction plus one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    pub system_instruction: String,
    pub user_text: String,
}

impl LlmRequest {
    pub fn new(system_instruction: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_text: user_text.into(),
        }
    }
}

/// LLM response from a single-shot call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub text: String,
    pub end_turn: bool,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_turn: true,
        }
    }
}

/// Incremental text fragments, yielded in the order the service produced them.
///
/// An `Err` item ends the stream; nothing is yielded after it.
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;
