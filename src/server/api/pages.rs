//! Chat pages, static assets and health.

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::server::error::ApiError;
use crate::server::state::AppState;

async fn serve_page(state: &AppState, file: &str, request: Request) -> Response {
    let path = state.static_dir.join(file);
    match ServeFile::new(&path).oneshot(request).await {
        Ok(response) if response.status().is_success() => response.into_response(),
        Ok(_) => ApiError::NotFound(format!("page {} not found", file)).into_response(),
        Err(e) => ApiError::Internal(format!("{}: {}", path.display(), e)).into_response(),
    }
}

async fn chat_page(State(state): State<AppState>, request: Request) -> Response {
    serve_page(&state, "chat.html", request).await
}

async fn advanced_chat_page(State(state): State<AppState>, request: Request) -> Response {
    serve_page(&state, "advanced-chat.html", request).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chat_page))
        .route("/chat", get(chat_page))
        .route("/advanced-chat", get(advanced_chat_page))
        .route("/health", get(health))
}
