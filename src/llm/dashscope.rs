//! Alibaba Bailian (DashScope) text-generation adapter.

use async_trait::async_trait;
use serde_json::json;

use super::provider::{build_http_client, post_json, ModelService, ProviderError, ProviderSettings};
use super::types::{ChatMessage, GenerationOptions};

/// The environment variable holding the DashScope API key.
pub const DASHSCOPE_API_KEY_ENV: &str = "ALIBABA_BAILIAN_API_KEY";

/// Default DashScope text-generation endpoint.
pub const DASHSCOPE_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";

/// Default DashScope model.
pub const DASHSCOPE_DEFAULT_MODEL: &str = "qwen-max";

const PROVIDER_NAME: &str = "dashscope";

/// Client for the DashScope generation API.
///
/// DashScope is prompt-oriented here: chat requests are flattened into a
/// single transcript prompt.
pub struct DashScopeProvider {
    settings: ProviderSettings,
    http_client: reqwest::Client,
}

impl DashScopeProvider {
    /// Create an adapter, failing if no API key is configured.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        if settings.api_key().is_none() {
            return Err(ProviderError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                env_var: DASHSCOPE_API_KEY_ENV,
            });
        }
        Ok(Self::deferred(settings))
    }

    /// Create an adapter that stays inert until called when no key is set.
    pub fn deferred(settings: ProviderSettings) -> Self {
        if settings.api_key().is_none() {
            log::warn!(
                "{} not set; {} will fail at call time",
                DASHSCOPE_API_KEY_ENV,
                PROVIDER_NAME
            );
        }
        let http_client = build_http_client(settings.timeout);
        Self {
            settings,
            http_client,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.settings
            .api_key()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                env_var: DASHSCOPE_API_KEY_ENV,
            })
    }
}

/// Flatten a conversation into the `role: content` transcript DashScope
/// receives, ending with an open assistant turn.
pub fn transcript_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = messages
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str("\nAssistant:");
    prompt
}

#[async_trait]
impl ModelService for DashScopeProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let body = json!({
            "model": self.settings.model,
            "input": { "prompt": prompt },
            "parameters": {
                "temperature": options.temperature,
                "top_p": options.top_p,
                "max_tokens": options.max_tokens,
            }
        });

        let request = self
            .http_client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .header("X-DashScope-SSE", "disable")
            .json(&body);

        let value = post_json(PROVIDER_NAME, request).await?;

        value
            .pointer("/output/text")
            .and_then(|text| text.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                detail: "missing output.text".to_string(),
            })
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let prompt = transcript_prompt(messages);
        self.generate_text(&prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.map(str::to_string),
            endpoint: DASHSCOPE_ENDPOINT.to_string(),
            model: DASHSCOPE_DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = DashScopeProvider::new(settings(None));
        assert!(matches!(
            result,
            Err(ProviderError::NotConfigured {
                env_var: DASHSCOPE_API_KEY_ENV,
                ..
            })
        ));

        let result = DashScopeProvider::new(settings(Some("  ")));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_with_key() {
        let provider = DashScopeProvider::new(settings(Some("sk-test"))).unwrap();
        assert_eq!(provider.settings.model, "qwen-max");
        assert_eq!(provider.settings.endpoint, DASHSCOPE_ENDPOINT);
    }

    #[tokio::test]
    async fn test_deferred_fails_at_call_time() {
        let provider = DashScopeProvider::deferred(settings(None));

        let result = provider
            .generate_text("hello", &GenerationOptions::default())
            .await;
        assert!(matches!(result, Err(ProviderError::NotConfigured { .. })));
    }

    #[test]
    fn test_transcript_prompt() {
        let prompt = transcript_prompt(&[
            ChatMessage::system("你是军事专家"),
            ChatMessage::user("赤壁之战"),
        ]);
        assert_eq!(prompt, "system: 你是军事专家\nuser: 赤壁之战\nAssistant:");
    }
}
