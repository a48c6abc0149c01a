//! Conversational military-history analysis.
//!
//! This endpoint always answers 200: failures become an apologetic reply.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, GenerationOptions, Role};
use crate::server::error::ApiError;
use crate::server::state::AppState;

pub const MILITARY_SYSTEM_PROMPT: &str =
    "你是一位精通中国古代和近代战争史的军事专家，请以专业、严谨、条理清晰的方式回答用户的问题。";

pub const EMPTY_PROMPT_REPLY: &str = "请输入您的军事历史问题。";

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub response: String,
}

impl AnalysisResponse {
    fn new(response: impl Into<String>) -> Json<Self> {
        Json(Self {
            response: response.into(),
        })
    }
}

/// The conversation sent upstream, with the historian prompt in front
/// unless the caller supplied their own system message.
fn conversation(request: &AnalysisRequest) -> Option<Vec<ChatMessage>> {
    let mut messages = if request.messages.is_empty() {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        vec![ChatMessage::user(prompt)]
    } else {
        request.messages.clone()
    };

    if messages.first().map(|m| m.role) != Some(Role::System) {
        messages.insert(0, ChatMessage::system(MILITARY_SYSTEM_PROMPT));
    }
    Some(messages)
}

async fn military_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    request
        .options
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let messages = match conversation(&request) {
        Some(messages) => messages,
        None => return Ok(AnalysisResponse::new(EMPTY_PROMPT_REPLY)),
    };

    log::info!("Military analysis request with {} messages", messages.len());
    match state.model.chat_completion(&messages, &request.options).await {
        Ok(text) => Ok(AnalysisResponse::new(text)),
        Err(e) => {
            log::error!("Military analysis failed: {}", e);
            Ok(AnalysisResponse::new(format!("服务暂时不可用: {}", e)))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/llm/military-analysis", post(military_analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> AnalysisRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prompt_gets_system_prompt() {
        let messages = conversation(&request(r#"{"prompt":" 赤壁之战 "}"#)).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, MILITARY_SYSTEM_PROMPT);
        assert_eq!(messages[1], ChatMessage::user("赤壁之战"));
    }

    #[test]
    fn test_caller_system_message_kept() {
        let messages = conversation(&request(
            r#"{"messages":[{"role":"system","content":"简短回答"},{"role":"user","content":"淝水之战"}]}"#,
        ))
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "简短回答");
    }

    #[test]
    fn test_blank_prompt_has_no_conversation() {
        assert!(conversation(&request(r#"{"prompt":"   "}"#)).is_none());
        assert!(conversation(&request("{}")).is_none());
    }

    #[test]
    fn test_options_default_when_absent() {
        let parsed = request(r#"{"prompt":"x","max_tokens":512}"#);
        assert_eq!(parsed.options.max_tokens, 512);
        assert_eq!(parsed.options.temperature, crate::llm::DEFAULT_TEMPERATURE);
    }
}
