//! Dynasty, city and battle datasets.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::knowledge::{Dynasty, DynastyCities, DynastyEvents, QuickSearch};
use crate::server::error::ApiError;
use crate::server::state::AppState;

async fn dynasties(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let dynasties = state.datasets.dynasties().await?;
    log::info!("Serving {} dynasties", dynasties.len());
    Ok(Json(json!({
        "count": dynasties.len(),
        "dynasties": dynasties,
    })))
}

async fn dynasty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dynasty>, ApiError> {
    Ok(Json(state.datasets.dynasty(&id).await?))
}

async fn cities(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DynastyCities>, ApiError> {
    Ok(Json(state.datasets.dynasty_cities(&id).await?))
}

async fn historical_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DynastyEvents>, ApiError> {
    Ok(Json(state.datasets.historical_events(&id).await?))
}

async fn city_mappings(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.datasets.city_mappings().await?))
}

async fn categories(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = state.datasets.categories().await?;
    let count = categories.as_object().map(|m| m.len()).unwrap_or(0);
    Ok(Json(json!({
        "categories": categories,
        "count": count,
    })))
}

async fn search_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let results = state.datasets.search_city(&name).await?;
    Ok(Json(json!({
        "query": name,
        "count": results.len(),
        "results": results,
    })))
}

#[derive(Debug, Deserialize)]
struct QuickSearchParams {
    #[serde(default)]
    query: String,
}

async fn quick_search(
    State(state): State<AppState>,
    Query(params): Query<QuickSearchParams>,
) -> Json<QuickSearch> {
    Json(state.datasets.quick_search(&params.query).await)
}

async fn battle(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.datasets.battle(&name).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/data/dynasties", get(dynasties))
        .route("/api/v1/data/dynasty/{id}", get(dynasty))
        .route("/api/v1/data/cities/{id}", get(cities))
        .route("/api/v1/data/historical-events/{id}", get(historical_events))
        .route("/api/v1/data/city-mappings", get(city_mappings))
        .route("/api/v1/data/categories", get(categories))
        .route("/api/v1/data/search-city/{name}", get(search_city))
        .route("/api/v1/data/quick-search", get(quick_search))
        .route("/api/v1/data/battle/{name}", get(battle))
}
