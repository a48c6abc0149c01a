//! Bounded polling of an asynchronous video job.

use std::time::Duration;

use super::client::VideoBackend;
use super::error::VideoError;
use super::job::JobStatus;
use super::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use crate::config::VideoConfig;

/// Polls a job until it reaches a terminal state or the attempt budget runs out.
///
/// Every status check counts as one attempt, whether it succeeds, errors, or
/// returns a status the backend is not documented to send. The poller sleeps
/// `interval` between attempts but not after the last one, so the worst-case
/// wait is `(max_attempts - 1) * interval` plus request time.
#[derive(Debug, Clone)]
pub struct JobPoller {
    interval: Duration,
    max_attempts: u32,
    error_streak_limit: Option<u32>,
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_POLL_ATTEMPTS)
    }
}

impl JobPoller {
    /// Create a poller. `max_attempts` is at least 1.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            error_streak_limit: None,
        }
    }

    /// Give up early after `limit` consecutive failed status checks.
    pub fn with_error_streak_limit(mut self, limit: u32) -> Self {
        self.error_streak_limit = Some(limit.max(1));
        self
    }

    pub fn from_config(config: &VideoConfig) -> Self {
        let poller = Self::new(
            Duration::from_secs(config.poll_interval_secs),
            config.max_poll_attempts,
        );
        match config.error_streak_limit {
            Some(limit) => poller.with_error_streak_limit(limit),
            None => poller,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn error_streak_limit(&self) -> Option<u32> {
        self.error_streak_limit
    }

    /// Wait for `job_id` to finish and return its video URL.
    ///
    /// # Errors
    ///
    /// - `VideoError::JobFailed` as soon as the backend reports `FAIL`
    /// - `VideoError::InconsistentState` for `SUCCESS` without a URL
    /// - `VideoError::StatusUnavailable` when the error streak limit is hit
    /// - `VideoError::Timeout` once every attempt is used
    pub async fn wait_for_result<B>(&self, backend: &B, job_id: &str) -> Result<String, VideoError>
    where
        B: VideoBackend + ?Sized,
    {
        let mut streak = 0u32;

        for attempt in 1..=self.max_attempts {
            match backend.fetch_job(job_id).await {
                Ok(job) => {
                    streak = 0;
                    match job.status {
                        JobStatus::Success => {
                            return match job.result_url {
                                Some(url) => {
                                    log::info!(
                                        "Video job {} finished after {} polls",
                                        job_id,
                                        attempt
                                    );
                                    Ok(url)
                                }
                                None => Err(VideoError::InconsistentState {
                                    job_id: job_id.to_string(),
                                }),
                            };
                        }
                        JobStatus::Fail => {
                            log::error!("Video job {} failed on the backend", job_id);
                            return Err(VideoError::JobFailed {
                                job_id: job_id.to_string(),
                            });
                        }
                        JobStatus::Queued | JobStatus::Processing => {
                            log::debug!(
                                "Video job {} still {:?} ({}/{})",
                                job_id,
                                job.status,
                                attempt,
                                self.max_attempts
                            );
                        }
                    }
                }
                Err(e) => {
                    streak += 1;
                    log::warn!(
                        "Status check for video job {} failed ({}/{}): {}",
                        job_id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    if let Some(limit) = self.error_streak_limit {
                        if streak >= limit {
                            return Err(VideoError::StatusUnavailable {
                                job_id: job_id.to_string(),
                                streak,
                                last_error: e.to_string(),
                            });
                        }
                    }
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        log::error!(
            "Video job {} timed out after {} polls",
            job_id,
            self.max_attempts
        );
        Err(VideoError::Timeout {
            job_id: job_id.to_string(),
            attempts: self.max_attempts,
        })
    }
}
