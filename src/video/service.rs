//! Submit, poll, and fall back to a mock video when the backend is unavailable.

use std::sync::Arc;

use serde::Serialize;

use super::client::{VideoBackend, VideoClient};
use super::error::VideoError;
use super::poller::JobPoller;
use super::prompt::{build_cinematic_prompt, ScenarioStep};
use crate::config::Config;
use crate::fallback::mock_video_url;

/// Where a returned video URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    Backend,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedVideo {
    pub video_url: String,
    pub source: VideoSource,
}

impl GeneratedVideo {
    fn mock(text: &str) -> Self {
        Self {
            video_url: mock_video_url(text),
            source: VideoSource::Mock,
        }
    }
}

/// Turns a text request into a video URL.
///
/// A missing backend or a failed submission yields the mock URL. Once a job
/// has been accepted, polling errors are returned to the caller.
#[derive(Clone)]
pub struct VideoService {
    backend: Option<Arc<dyn VideoBackend>>,
    poller: JobPoller,
}

impl VideoService {
    pub fn new(backend: Option<Arc<dyn VideoBackend>>, poller: JobPoller) -> Self {
        Self { backend, poller }
    }

    /// Build from configuration. Without a credential only mock URLs are served.
    pub fn from_config(config: &Config) -> Self {
        let poller = JobPoller::from_config(&config.video);
        let backend = match config.keys.video.clone() {
            Some(key) => match VideoClient::from_config(&config.video, key) {
                Ok(client) => {
                    log::info!(
                        "Video backend ready: model={} at {}",
                        client.model(),
                        client.base_url()
                    );
                    let backend: Arc<dyn VideoBackend> = Arc::new(client);
                    Some(backend)
                }
                Err(e) => {
                    log::error!("Video client unavailable: {}", e);
                    None
                }
            },
            None => {
                log::warn!("No video API key configured; video requests will use mock URLs");
                None
            }
        };
        Self::new(backend, poller)
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Generate a video for `text`, optionally enriched with scenario steps.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::EmptyPrompt` for blank text, and the poller's
    /// errors (`Timeout`, `JobFailed`, `InconsistentState`,
    /// `StatusUnavailable`) once a job has been submitted.
    pub async fn generate(
        &self,
        text: &str,
        steps: &[ScenarioStep],
    ) -> Result<GeneratedVideo, VideoError> {
        if text.trim().is_empty() {
            return Err(VideoError::EmptyPrompt);
        }

        let backend = match &self.backend {
            Some(backend) => backend,
            None => return Ok(GeneratedVideo::mock(text)),
        };

        let prompt = build_cinematic_prompt(text, steps);
        let job_id = match backend.submit(&prompt).await {
            Ok(job_id) => job_id,
            Err(e) => {
                log::warn!("Video submission failed, using mock video: {}", e);
                return Ok(GeneratedVideo::mock(text));
            }
        };

        let video_url = self.poller.wait_for_result(backend.as_ref(), &job_id).await?;
        Ok(GeneratedVideo {
            video_url,
            source: VideoSource::Backend,
        })
    }
}
