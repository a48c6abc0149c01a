//! The model service capability and its error type.

use std::time::Duration;

use async_trait::async_trait;

use super::types::{ChatMessage, GenerationOptions};

/// Default timeout for a single provider call (30 seconds).
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A text-generation backend.
///
/// Implementations issue exactly one outbound request per call and never
/// retry; retrying belongs to [`FailoverService`](super::FailoverService).
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate text from a single prompt.
    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;

    /// Complete a conversation given its messages, oldest first.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;
}

/// Connection settings for one provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    /// The credential, treating an empty string as absent.
    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

/// Errors raised by model services.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} is not configured: {env_var} is not set")]
    NotConfigured {
        provider: String,
        env_var: &'static str,
    },

    #[error("{provider} request failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse { provider: String, detail: String },

    #[error("primary provider failed ({primary}); backup provider failed ({backup})")]
    Exhausted {
        primary: Box<ProviderError>,
        backup: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Name of the provider that produced this error.
    ///
    /// For an exhausted failover this is the backup, the last one tried.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::NotConfigured { provider, .. }
            | ProviderError::Http { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::MalformedResponse { provider, .. } => provider,
            ProviderError::Exhausted { backup, .. } => backup.provider(),
        }
    }
}

/// Build the HTTP client used by provider adapters.
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Send a JSON POST and return the parsed body, normalizing every failure.
pub(crate) async fn post_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let response = request.send().await.map_err(|source| ProviderError::Http {
        provider: provider.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::MalformedResponse {
            provider: provider.to_string(),
            detail: e.to_string(),
        })
}
