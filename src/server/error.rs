//! HTTP-boundary error type.
//!
//! Handlers return `Result<T, ApiError>`; the error renders as
//! `{"error": message}` with a matching status code. Internal details are
//! logged and replaced with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::knowledge::DatasetError;
use crate::video::VideoError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream failure: {0}")]
    BadGateway(String),

    #[error("upstream timeout: {0}")]
    GatewayTimeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::BadRequest(m)
            | ApiError::NotFound(m)
            | ApiError::BadGateway(m)
            | ApiError::GatewayTimeout(m) => m.clone(),
            ApiError::Internal(m) => {
                log::error!("Internal server error: {}", m);
                "internal server error".to_string()
            }
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

impl From<DatasetError> for ApiError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::NotFound(m) => ApiError::NotFound(m),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<VideoError> for ApiError {
    fn from(e: VideoError) -> Self {
        match e {
            VideoError::EmptyPrompt => ApiError::BadRequest("text must not be empty".to_string()),
            VideoError::Timeout { .. } => ApiError::GatewayTimeout(e.to_string()),
            VideoError::JobFailed { .. }
            | VideoError::InconsistentState { .. }
            | VideoError::StatusUnavailable { .. } => ApiError::BadGateway(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
