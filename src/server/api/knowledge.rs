use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::knowledge::{BattleAnalysis, FigureProfile, WeaponProfile};
use crate::server::error::ApiError;
use crate::server::state::AppState;

fn not_found(kind: &str, query: &str) -> ApiError {
    ApiError::NotFound(format!("未找到关于 {} 的{}信息", query, kind))
}

async fn battle(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<BattleAnalysis>, ApiError> {
    state
        .knowledge
        .battle_analysis(&query)
        .map(Json)
        .ok_or_else(|| not_found("战役", &query))
}

async fn weapon(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<WeaponProfile>, ApiError> {
    state
        .knowledge
        .weapon_profile(&query)
        .map(Json)
        .ok_or_else(|| not_found("武器", &query))
}

async fn figure(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<FigureProfile>, ApiError> {
    state
        .knowledge
        .figure_profile(&query)
        .map(Json)
        .ok_or_else(|| not_found("历史人物", &query))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/knowledge/battle/{query}", get(battle))
        .route("/api/v1/knowledge/weapon/{query}", get(weapon))
        .route("/api/v1/knowledge/figure/{query}", get(figure))
}
