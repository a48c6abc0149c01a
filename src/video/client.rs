//! VideoClient - handles communication with the text-to-video API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::VideoError;
use super::job::{JobStatus, VideoJob};
use super::{VIDEO_API_BASE_URL, VIDEO_DEFAULT_MODEL};
use crate::config::VideoConfig;

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validate a prompt before sending it to the API.
pub fn validate_prompt(prompt: &str) -> Result<(), VideoError> {
    if prompt.trim().is_empty() {
        return Err(VideoError::EmptyPrompt);
    }
    Ok(())
}

/// The two calls the poller and service need from a video backend.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Start a job and return its identifier.
    async fn submit(&self, prompt: &str) -> Result<String, VideoError>;

    /// Fetch the current state of a job.
    async fn fetch_job(&self, job_id: &str) -> Result<VideoJob, VideoError>;
}

/// Request body for video generation.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from job submission.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Response from the status endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    task_status: Option<String>,
    #[serde(default)]
    video_result: Vec<VideoOutput>,
}

#[derive(Debug, Deserialize)]
struct VideoOutput {
    #[serde(default)]
    url: Option<String>,
}

/// Client for the asynchronous text-to-video API.
pub struct VideoClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl VideoClient {
    /// Create a new VideoClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, VideoError> {
        Self::build(
            api_key,
            VIDEO_API_BASE_URL.to_string(),
            VIDEO_DEFAULT_MODEL.to_string(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Create a new VideoClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, VideoError> {
        Self::build(
            api_key,
            base_url,
            VIDEO_DEFAULT_MODEL.to_string(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Create a VideoClient from the `[video]` config section.
    pub fn from_config(config: &VideoConfig, api_key: String) -> Result<Self, VideoError> {
        Self::build(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )
    }

    fn build(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, VideoError> {
        if api_key.trim().is_empty() {
            return Err(VideoError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a video generation request.
    ///
    /// Returns the job identifier used to poll for completion.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::EmptyPrompt` if the prompt is empty,
    /// `VideoError::ApiError` if the API rejects the request,
    /// `VideoError::Submission` if the response carries no job id,
    /// or `VideoError::HttpError` if the request fails.
    pub async fn submit_generation(&self, prompt: &str) -> Result<String, VideoError> {
        validate_prompt(prompt)?;

        let url = format!("{}/videos/generations", self.base_url);
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VideoError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| VideoError::Submission(format!("unreadable response: {}", e)))?;

        match body.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                log::info!("Video job submitted: {}", id);
                Ok(id)
            }
            None => Err(VideoError::Submission("response has no job id".to_string())),
        }
    }

    /// Poll the status of a job.
    ///
    /// A `SUCCESS` response without a URL is returned as-is; deciding what
    /// that means is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::HttpError` if the request fails,
    /// `VideoError::ApiError` on an error response,
    /// `VideoError::MalformedResponse` if the body cannot be read,
    /// or `VideoError::UnknownStatus` for an undocumented status string.
    pub async fn poll_status(&self, job_id: &str) -> Result<VideoJob, VideoError> {
        let url = format!("{}/async-result/{}", self.base_url, job_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VideoError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| VideoError::MalformedResponse(e.to_string()))?;

        let raw_status = body
            .task_status
            .ok_or_else(|| VideoError::MalformedResponse("missing task_status".to_string()))?;
        let status = JobStatus::from_wire(&raw_status)
            .ok_or_else(|| VideoError::UnknownStatus(raw_status.clone()))?;

        let mut job = VideoJob::new(job_id, status);
        if let Some(url) = body
            .video_result
            .into_iter()
            .next()
            .and_then(|output| output.url)
            .filter(|url| !url.trim().is_empty())
        {
            job = job.with_result_url(url);
        }
        Ok(job)
    }
}

#[async_trait]
impl VideoBackend for VideoClient {
    async fn submit(&self, prompt: &str) -> Result<String, VideoError> {
        self.submit_generation(prompt).await
    }

    async fn fetch_job(&self, job_id: &str) -> Result<VideoJob, VideoError> {
        self.poll_status(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_creates_client() {
        let client = VideoClient::with_api_key("test-api-key".to_string()).unwrap();
        assert_eq!(client.api_key, "test-api-key");
        assert_eq!(client.base_url(), VIDEO_API_BASE_URL);
        assert_eq!(client.model(), VIDEO_DEFAULT_MODEL);
    }

    #[test]
    fn test_with_api_key_empty_returns_error() {
        let result = VideoClient::with_api_key("".to_string());
        assert!(matches!(result, Err(VideoError::MissingApiKey)));
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let client =
            VideoClient::with_base_url("test-key".to_string(), "http://127.0.0.1:9/".to_string())
                .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        assert_eq!(client.model(), VIDEO_DEFAULT_MODEL);
    }

    #[test]
    fn test_from_config_uses_section_values() {
        let config = VideoConfig {
            base_url: "http://localhost:1234/v4".to_string(),
            model: "custom".to_string(),
            ..VideoConfig::default()
        };
        let client = VideoClient::from_config(&config, "k".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v4");
        assert_eq!(client.model(), "custom");
    }

    #[test]
    fn test_validate_prompt_rejects_whitespace() {
        assert!(matches!(validate_prompt("   "), Err(VideoError::EmptyPrompt)));
        assert!(validate_prompt("赤壁之战").is_ok());
    }

    #[tokio::test]
    async fn test_submit_generation_empty_prompt_skips_request() {
        let client =
            VideoClient::with_base_url("k".to_string(), "http://127.0.0.1:9".to_string()).unwrap();
        let result = client.submit_generation("").await;
        assert!(matches!(result, Err(VideoError::EmptyPrompt)));
    }

    #[test]
    fn test_generate_request_serialization() {
        let request = GenerateRequest {
            model: "cogvideox-flash",
            prompt: "史诗战役",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "cogvideox-flash");
        assert_eq!(json["prompt"], "史诗战役");
    }

    #[test]
    fn test_status_response_deserialization() {
        let body = serde_json::json!({
            "task_status": "SUCCESS",
            "video_result": [{ "url": "https://v/x.mp4", "cover_image_url": "https://v/x.png" }]
        });
        let parsed: StatusResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.task_status.as_deref(), Some("SUCCESS"));
        assert_eq!(parsed.video_result[0].url.as_deref(), Some("https://v/x.mp4"));

        let pending: StatusResponse =
            serde_json::from_str(r#"{"task_status":"PROCESSING"}"#).unwrap();
        assert!(pending.video_result.is_empty());
    }
}
