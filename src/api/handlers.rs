//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    ChatRequest, CreateSessionRequest, ErrorResponse, ModelsResponse, ProfileRequest,
    QueuedResponse, SessionResponse, SuccessResponse, TravelStyleOption,
};
use super::AppState;
use crate::runtime::SessionHandle;
use crate::state_machine::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the widget
        .route("/", get(serve_widget))
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/delete", post(delete_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/profile", post(save_profile))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/plan", post(plan_itinerary))
        .route("/api/sessions/:id/clear", post(clear_conversation))
        // Form and model info
        .route("/api/travel-styles", get(list_travel_styles))
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Widget
// ============================================================

async fn serve_widget() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - widget not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let model = req.model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());

    if let Some(model) = &model {
        if state.llm_registry.get(model).is_none() {
            return Err(AppError::BadRequest(format!("Unknown model: {model}")));
        }
    }

    let (_, handle) = state.sessions.create(model).await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session: handle.snapshot(),
        }),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, &id).await?;
    Ok(Json(SessionResponse {
        session: handle.snapshot(),
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.sessions.destroy(&id).await {
        return Err(AppError::NotFound(format!("Session not found: {id}")));
    }
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = find_session(&state, &id).await?;

    // Subscribe before reading the snapshot so no update falls in between
    let broadcast_rx = handle.broadcast_tx.subscribe();
    Ok(sse_stream(handle.snapshot_rx.clone(), broadcast_rx))
}

// ============================================================
// User Actions
// ============================================================

async fn save_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    req.profile
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    send_event(&state, &id, Event::SubmitProfile { profile: req.profile }).await
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    send_event(&state, &id, Event::SubmitUserMessage { text: req.text }).await
}

async fn plan_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedResponse>, AppError> {
    send_event(&state, &id, Event::PlanFullItinerary).await
}

async fn clear_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedResponse>, AppError> {
    send_event(&state, &id, Event::ClearConversation).await
}

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

async fn send_event(
    state: &AppState,
    id: &str,
    event: Event,
) -> Result<Json<QueuedResponse>, AppError> {
    let handle = find_session(state, id).await?;
    handle
        .event_tx
        .send(event)
        .await
        .map_err(|_| AppError::Internal(format!("Session runtime stopped: {id}")))?;
    Ok(Json(QueuedResponse { queued: true }))
}

// ============================================================
// Form and Model Info
// ============================================================

async fn list_travel_styles() -> Json<Vec<TravelStyleOption>> {
    Json(TravelStyleOption::all())
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("trip_planner ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
