//! Trip planner - conversational travel itinerary widget
//!
//! Serves a single-page chat widget and forwards trip requests to Gemini,
//! streaming the reply when the model allows it.

mod api;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use llm::{ConfigError, LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port = match parse_port(std::env::var("TRIP_PLANNER_PORT").ok()) {
        Ok(port) => port,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Initialize LLM registry. Without an API key nothing can work.
    let llm_config = LlmConfig::from_env();
    let llm_registry = match ModelRegistry::new(&llm_config) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize LLM registry");
            return Err(e.into());
        }
    };
    tracing::info!(
        models = ?llm_registry.available_models(),
        default = %llm_registry.default_model_id(),
        "LLM registry initialized"
    );

    // Create application state
    let state = AppState::new(llm_registry);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Trip planner listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Port from the environment value, `DEFAULT_PORT` when unset or blank
fn parse_port(value: Option<String>) -> Result<u16, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(raw.to_string())),
    }
}
