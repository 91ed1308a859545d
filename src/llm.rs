//! LLM provider abstraction
//!
//! Provides a common interface for the text-generation service the planner
//! talks to. Providers expose a single-shot `complete` and, when the backing
//! API supports it, an incremental `open_stream`.

mod error;
mod gemini;
mod models;
mod registry;
mod sse;
mod types;


#[allow(unused_imports)] // Public API re-exports
pub use error::{LlmError, LlmErrorKind};
pub use registry::{ConfigError, LlmConfig, ModelRegistry};
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a single blocking completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Open an incremental response channel.
    ///
    /// Providers without streaming support keep the default, which fails
    /// with [`LlmErrorKind::Unsupported`].
    async fn open_stream(&self, _request: &LlmRequest) -> Result<TextStream, LlmError> {
        Err(LlmError::unsupported(format!(
            "{} does not support streaming",
            self.model_id()
        )))
    }

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    response_chars = response.text.chars().count(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    async fn open_stream(&self, request: &LlmRequest) -> Result<TextStream, LlmError> {
        let start = std::time::Instant::now();
        match self.inner.open_stream(request).await {
            Ok(stream) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    "LLM stream opened"
                );
                let model_id = self.model_id.clone();
                Ok(stream
                    .inspect(move |item| {
                        if let Err(e) = item {
                            tracing::warn!(
                                model = %model_id,
                                error = %e.message,
                                kind = e.kind.as_str(),
                                "LLM stream failed mid-response"
                            );
                        }
                    })
                    .boxed())
            }
            Err(e) => {
                tracing::warn!(
                    model = %self.model_id,
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "LLM stream could not be opened"
                );
                Err(e)
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
