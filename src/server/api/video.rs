use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::video::{GeneratedVideo, ScenarioStep};

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

async fn generate_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<GeneratedVideo>, ApiError> {
    let video = state.video.generate(&request.text, &request.steps).await?;
    log::info!("Video ready ({:?}): {}", video.source, video.video_url);
    Ok(Json(video))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/video/generate", post(generate_video))
}
