//! Battle deduction: a structured, step-by-step scenario for map animation.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::fallback::{mock_deduction, strip_code_fences};
use crate::llm::{ChatMessage, GenerationOptions};
use crate::server::state::AppState;

/// Completion budget for deductions; the JSON is long.
pub const DEDUCTION_MAX_TOKENS: u32 = 4000;

const DEDUCTION_SYSTEM_PROMPT: &str = concat!(
    "你是一个专业的军事历史战役推演引擎。",
    "你的目标是生成一个结构化的JSON序列，用于在3D地图上可视化战役过程。",
    "输出必须是有效的JSON格式。不要包含markdown格式（如 ```json ... ```）。",
    "请基于真实的历史史料进行推演，确保地理位置、部队动向和时间节点的准确性。",
    "【重要】阵营分类规则：\n",
    "   - 必须将对战双方严格区分为【红方】（Red）和【蓝方】（Blue）。\n",
    "   - 进攻方、侵略者或北方势力通常标记为 'color': 'red'。\n",
    "   - 防守方、抵抗者或南方势力通常标记为 'color': 'blue'。\n",
    "   - 第三方或中立势力可以使用 'orange' 或 'green'。\n",
    "JSON结构如下：\n",
    "{\n",
    "  'title': '战役名称',\n",
    "  'location': [经度, 纬度],\n",
    "  'zoom': 11,\n",
    "  'steps': [\n",
    "    {\n",
    "      'time': '阶段 N: [时间/阶段名]',\n",
    "      'description': '该阶段的详细战况描述(100-200字)，引用历史背景、兵力部署、关键决策和地理环境影响。',\n",
    "      'actions': [\n",
    "        {\n",
    "          'type': 'marker', // 或 'path', 'arrow', 'circle'\n",
    "          'label': '部队/地点名称',\n",
    "          'coordinate': [经度, 纬度],\n",
    "          'color': 'red',\n",
    "          'radius': 1000 // 仅适用于 circle\n",
    "        }\n",
    "      ]\n",
    "    }\n",
    "  ]\n",
    "}",
    "要求：\n",
    "1. 生成至少 8-12 个详细步骤，完整覆盖战役的前奏、发展、高潮和结局。\n",
    "2. 描述要生动、专业，体现军事战略和战术细节。\n",
    "3. 充分利用地图动作(actions)来展示部队移动(path/arrow)、交战点(marker)和影响范围(circle)。\n",
);

#[derive(Debug, Deserialize)]
pub struct DeductionRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Parse model output as a scenario, tolerating a markdown fence.
pub fn parse_scenario(content: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fences(content)).ok()
}

async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<DeductionRequest>,
) -> Json<Value> {
    let query = request.prompt.trim();
    if query.is_empty() {
        return Json(json!({ "error": "Please provide a battle name or query." }));
    }

    let messages = [
        ChatMessage::system(DEDUCTION_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "请根据历史史料，详细推演这场战役：{}。请模拟“正在检索历史数据库”的过程，并在生成的描述中体现史料依据。",
            query
        )),
    ];
    let options = GenerationOptions::default().with_max_tokens(DEDUCTION_MAX_TOKENS);

    log::info!("Running battle deduction: {}", query);
    match state.model.chat_completion(&messages, &options).await {
        Ok(content) => match parse_scenario(&content) {
            Some(scenario) => Json(scenario),
            None => {
                let preview: String = content.chars().take(100).collect();
                log::error!("Deduction output is not JSON: {}...", preview);
                Json(mock_deduction(query))
            }
        },
        Err(e) => {
            log::error!("Deduction failed, serving mock scenario: {}", e);
            Json(mock_deduction(query))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/deduction/simulate", post(simulate))
}
