//! Router-level tests driven through `tower::ServiceExt::oneshot`.
//!
//! Every test builds its own state: a scripted model service, a video
//! service without a backend, and knowledge files in a temp directory.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use zhuge_server::fallback::mock_video_url;
use zhuge_server::knowledge::{DatasetStore, KnowledgeBase, BATTLES_FILE, DYNASTIES_FILE};
use zhuge_server::llm::{ChatMessage, GenerationOptions, ModelService, ProviderError};
use zhuge_server::server::{create_router, AppState};
use zhuge_server::video::{JobPoller, VideoService};

/// Model service returning a fixed reply, or failing when `reply` is None.
struct ScriptedModel {
    reply: Option<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn answer(&self) -> Result<String, ProviderError> {
        self.reply.clone().ok_or_else(|| ProviderError::Api {
            provider: "scripted".to_string(),
            status: 503,
            message: "offline".to_string(),
        })
    }
}

#[async_trait]
impl ModelService for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_text(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.seen
            .lock()
            .unwrap()
            .push(vec![ChatMessage::user(prompt)]);
        self.answer()
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.answer()
    }
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn seed_knowledge(root: &Path) {
    write_file(
        root,
        BATTLES_FILE,
        &json!({
            "major_battles": [{
                "name": "赤壁之战",
                "date": "208年",
                "location": "赤壁",
                "participants": ["孙刘联军", "曹操"],
                "outcome": "孙刘联军胜",
                "tactics": ["火攻"]
            }]
        })
        .to_string(),
    );
    write_file(
        root,
        DYNASTIES_FILE,
        &json!({
            "dynasties": [{
                "id": "han",
                "name": "汉朝",
                "period": "前202年-220年",
                "majorCities": [
                    { "name": "长安", "modernName": "西安", "position": [108.9, 34.3] }
                ],
                "historicalEvents": [
                    { "year": 208, "event": "赤壁之战" },
                    { "year": -202, "event": "汉朝建立" }
                ]
            }]
        })
        .to_string(),
    );
}

struct Harness {
    _dir: TempDir,
    app: Router,
    model: Arc<ScriptedModel>,
}

fn harness(model: Arc<ScriptedModel>, seed: bool) -> Harness {
    let dir = TempDir::new().unwrap();
    let knowledge_dir = dir.path().join("knowledge_base");
    std::fs::create_dir_all(&knowledge_dir).unwrap();
    if seed {
        seed_knowledge(&knowledge_dir);
    }
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("chat.html"), "<html>chat</html>").unwrap();

    let model_service: Arc<dyn ModelService> = model.clone();
    let state = AppState {
        model: model_service,
        video: Arc::new(VideoService::new(None, JobPoller::default())),
        knowledge: Arc::new(KnowledgeBase::load(&knowledge_dir)),
        datasets: Arc::new(DatasetStore::new(
            knowledge_dir.clone(),
            dir.path().join("battle_cache"),
        )),
        static_dir: Arc::new(static_dir),
    };

    Harness {
        _dir: dir,
        app: create_router(state),
        model,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// === Health and pages ===

#[tokio::test]
async fn test_health() {
    let h = harness(ScriptedModel::replying("ok"), false);
    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_chat_page_served_and_missing_page_404() {
    let h = harness(ScriptedModel::replying("ok"), false);

    let response = h
        .app
        .clone()
        .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<html>chat</html>");

    let (status, body) = get(&h.app, "/advanced-chat").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// === Military analysis ===

#[tokio::test]
async fn test_military_analysis_replies_with_model_text() {
    let h = harness(ScriptedModel::replying("火攻是关键"), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/llm/military-analysis",
        json!({ "prompt": "赤壁之战为何胜利" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "火攻是关键");

    let seen = h.model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 2);
    assert_eq!(seen[0][1], ChatMessage::user("赤壁之战为何胜利"));
}

#[tokio::test]
async fn test_military_analysis_empty_prompt_skips_model() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/llm/military-analysis",
        json!({ "prompt": "  " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "请输入您的军事历史问题。");
    assert!(h.model.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_military_analysis_failure_is_still_ok() {
    let h = harness(ScriptedModel::failing(), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/llm/military-analysis",
        json!({ "prompt": "淝水之战" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .starts_with("服务暂时不可用"));
}

#[tokio::test]
async fn test_military_analysis_rejects_bad_temperature() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, _) = post(
        &h.app,
        "/api/v1/llm/military-analysis",
        json!({ "prompt": "x", "temperature": 5.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// === Deduction ===

#[tokio::test]
async fn test_deduction_passes_through_fenced_json() {
    let h = harness(
        ScriptedModel::replying("```json\n{\"title\":\"官渡之战\",\"steps\":[]}\n```"),
        false,
    );
    let (status, body) = post(
        &h.app,
        "/api/v1/deduction/simulate",
        json!({ "prompt": "官渡之战" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "官渡之战");
}

#[tokio::test]
async fn test_deduction_falls_back_to_mock_scenario() {
    let h = harness(ScriptedModel::failing(), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/deduction/simulate",
        json!({ "prompt": "官渡之战" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["title"].as_str().unwrap().contains("官渡之战"));
    assert_eq!(body["steps"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_deduction_prose_reply_falls_back() {
    let h = harness(ScriptedModel::replying("抱歉，我无法回答。"), false);
    let (_, body) = post(&h.app, "/api/v1/deduction/simulate", json!({ "prompt": "长平" })).await;
    assert!(body["title"].as_str().unwrap().starts_with("赤壁之战"));
}

#[tokio::test]
async fn test_deduction_empty_prompt() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(&h.app, "/api/v1/deduction/simulate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Please provide a battle name or query.");
}

// === Video ===

#[tokio::test]
async fn test_video_without_backend_returns_mock_url() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/video/generate",
        json!({ "text": "辽沈战役" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_url"], mock_video_url("辽沈战役"));
    assert_eq!(body["source"], "mock");
}

#[tokio::test]
async fn test_video_empty_text_is_bad_request() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(&h.app, "/api/v1/video/generate", json!({ "text": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// === Media ===

#[tokio::test]
async fn test_generate_image_placeholder() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/image/generate-image",
        json!({ "prompt": "古代战车" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["image_url"]
        .as_str()
        .unwrap()
        .starts_with("https://placehold.co/"));
}

#[tokio::test]
async fn test_multimodal_prefers_knowledge_base() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = post(
        &h.app,
        "/api/v1/multimodal/multimodal-analysis",
        json!({ "query": "赤壁" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "knowledge_base");
    assert!(body["text_response"].as_str().unwrap().contains("赤壁之战"));
    assert!(h.model.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_multimodal_asks_model_on_miss() {
    let h = harness(ScriptedModel::replying("模型分析"), true);
    let (status, body) = post(
        &h.app,
        "/api/v1/multimodal/multimodal-analysis",
        json!({ "query": "滑铁卢战役" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "ai_model");
    assert_eq!(body["text_response"], "模型分析");
    assert!(body["battle_data"].is_null());
}

#[tokio::test]
async fn test_multimodal_degrades_when_model_fails() {
    let h = harness(ScriptedModel::failing(), true);
    let (status, body) = post(
        &h.app,
        "/api/v1/multimodal/multimodal-analysis",
        json!({ "query": "滑铁卢战役" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert!(body["text_response"]
        .as_str()
        .unwrap()
        .starts_with("服务暂时不可用"));
    assert!(body["battle_data"].is_null());
    assert_eq!(h.model.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_battle_map_data_known_and_unknown() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = post(
        &h.app,
        "/api/v1/multimodal/get-battle-map-data",
        json!({ "query": "诺曼底登陆" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "诺曼底登陆");

    let (status, body) = post(
        &h.app,
        "/api/v1/multimodal/get-battle-map-data",
        json!({ "query": "不存在的战役" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "未找到该战役的地图数据");
}

// === Knowledge ===

#[tokio::test]
async fn test_knowledge_battle_lookup() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = get(&h.app, "/api/v1/knowledge/battle/%E8%B5%A4%E5%A3%81").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "赤壁之战");
    assert_eq!(body["participants"], "孙刘联军, 曹操");
}

#[tokio::test]
async fn test_knowledge_miss_is_404() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = get(&h.app, "/api/v1/knowledge/weapon/tiger").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "未找到关于 tiger 的武器信息");
}

// === Datasets ===

#[tokio::test]
async fn test_dynasties_listing() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = get(&h.app, "/api/v1/data/dynasties").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["dynasties"][0]["id"], "han");
}

#[tokio::test]
async fn test_historical_events_sorted() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = get(&h.app, "/api/v1/data/historical-events/han").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventCount"], 2);
    assert_eq!(body["events"][0]["year"], -202);
    assert_eq!(body["events"][1]["year"], 208);
}

#[tokio::test]
async fn test_unknown_dynasty_is_404() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = get(&h.app, "/api/v1/data/dynasty/tang").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "朝代 'tang' 未找到");
}

#[tokio::test]
async fn test_missing_dataset_is_500() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, body) = get(&h.app, "/api/v1/data/dynasties").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn test_search_city_by_modern_name() {
    let h = harness(ScriptedModel::replying("unused"), true);
    let (status, body) = get(&h.app, "/api/v1/data/search-city/%E8%A5%BF%E5%AE%89").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["cityName"], "长安");
}

#[tokio::test]
async fn test_battle_sample_and_unknown() {
    let h = harness(ScriptedModel::replying("unused"), false);
    let (status, _) = get(&h.app, "/api/v1/data/battle/%E8%B5%A4%E5%A3%81%E4%B9%8B%E6%88%98").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&h.app, "/api/v1/data/battle/waterloo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "战役未找到，请尝试'赤壁之战'");
}
