//! Image generation and multimodal battle analysis.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::fallback::placeholder_image_url;
use crate::knowledge::{battle_map_data, BattleMapData};
use crate::llm::GenerationOptions;
use crate::server::error::ApiError;
use crate::server::state::AppState;

const ANALYSIS_PREFIX: &str = "请详细分析军事历史问题：";
const ANALYSIS_ASPECTS: &str = concat!(
    "包括：历史背景、战略意义、战术特点、",
    "参战方、时间地点、结果影响。"
);

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_style() -> String {
    "realistic".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_url: String,
    pub prompt: String,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MultimodalResponse {
    pub text_response: String,
    pub battle_data: Option<BattleMapData>,
    pub available_actions: Vec<&'static str>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BattleImageResponse {
    pub image_url: String,
}

fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} cannot be empty", what)));
    }
    Ok(())
}

async fn generate_image(
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    require(&request.prompt, "Prompt")?;
    log::debug!(
        "Placeholder image for style={} size={}",
        request.style,
        request.size
    );
    Ok(Json(ImageResponse {
        image_url: placeholder_image_url(&request.prompt),
        prompt: request.prompt,
        status: "success",
    }))
}

async fn multimodal_analysis(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<MultimodalResponse>, ApiError> {
    require(&request.query, "Query")?;
    let query = request.query.trim();

    if let Some(analysis) = state.knowledge.battle_analysis(query) {
        return Ok(Json(MultimodalResponse {
            text_response: analysis.summary(),
            battle_data: battle_map_data(query),
            available_actions: vec!["generate_image", "show_3d_map", "generate_video"],
            source: "knowledge_base",
        }));
    }

    let prompt = format!("{}{}。\n{}", ANALYSIS_PREFIX, query, ANALYSIS_ASPECTS);
    let (text_response, source) = match state
        .model
        .generate_text(&prompt, &GenerationOptions::default())
        .await
    {
        Ok(text) => (text, "ai_model"),
        Err(e) => {
            log::error!("Multimodal analysis failed for '{}': {}", query, e);
            (format!("服务暂时不可用: {}", e), "fallback")
        }
    };

    Ok(Json(MultimodalResponse {
        text_response,
        battle_data: None,
        available_actions: vec!["generate_image", "search_related_images"],
        source,
    }))
}

async fn generate_battle_image(
    Json(request): Json<QueryRequest>,
) -> Result<Json<BattleImageResponse>, ApiError> {
    require(&request.query, "Query")?;
    let prompt = format!(
        "historical battle scene of {}, realistic, detailed, cinematic",
        request.query.trim()
    );
    Ok(Json(BattleImageResponse {
        image_url: placeholder_image_url(&prompt),
    }))
}

async fn get_battle_map_data(
    Json(request): Json<QueryRequest>,
) -> Result<Json<BattleMapData>, ApiError> {
    battle_map_data(&request.query)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("未找到该战役的地图数据".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/image/generate-image", post(generate_image))
        .route(
            "/api/v1/multimodal/multimodal-analysis",
            post(multimodal_analysis),
        )
        .route(
            "/api/v1/multimodal/generate-battle-image",
            post(generate_battle_image),
        )
        .route(
            "/api/v1/multimodal/get-battle-map-data",
            post(get_battle_map_data),
        )
}
