//! OpenRouter adapter (OpenAI-compatible chat completions).

use async_trait::async_trait;
use serde_json::json;

use super::provider::{build_http_client, post_json, ModelService, ProviderError, ProviderSettings};
use super::types::{ChatMessage, GenerationOptions};

/// The environment variable holding the OpenRouter API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default OpenRouter chat completions endpoint.
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default OpenRouter model.
pub const OPENROUTER_DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

const PROVIDER_NAME: &str = "openrouter";

/// Client for OpenRouter's chat completions API.
pub struct OpenRouterProvider {
    settings: ProviderSettings,
    http_client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create an adapter, failing if no API key is configured.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        if settings.api_key().is_none() {
            return Err(ProviderError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                env_var: OPENROUTER_API_KEY_ENV,
            });
        }
        Ok(Self::deferred(settings))
    }

    /// Create an adapter that stays inert until called when no key is set.
    pub fn deferred(settings: ProviderSettings) -> Self {
        if settings.api_key().is_none() {
            log::warn!(
                "{} not set; {} will fail at call time",
                OPENROUTER_API_KEY_ENV,
                PROVIDER_NAME
            );
        }
        let http_client = build_http_client(settings.timeout);
        Self {
            settings,
            http_client,
        }
    }
}

#[async_trait]
impl ModelService for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.chat_completion(&[ChatMessage::user(prompt)], options)
            .await
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: PROVIDER_NAME.to_string(),
                env_var: OPENROUTER_API_KEY_ENV,
            })?;

        let body = json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "max_tokens": options.max_tokens,
        });

        let request = self
            .http_client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body);

        let value = post_json(PROVIDER_NAME, request).await?;

        value
            .pointer("/choices/0/message/content")
            .and_then(|content| content.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: PROVIDER_NAME.to_string(),
                detail: "missing choices[0].message.content".to_string(),
            })
    }
}
