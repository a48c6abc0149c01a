//! Text-to-video generation over an asynchronous job API.
//!
//! A job is submitted with a cinematic prompt, then polled until it succeeds,
//! fails, or the attempt budget runs out. When no job can be started the
//! service answers with a deterministic mock URL instead.

use std::time::Duration;

mod client;
mod error;
mod job;
mod poller;
mod prompt;
mod service;

pub use client::{validate_prompt, VideoBackend, VideoClient};
pub use error::VideoError;
pub use job::{JobStatus, VideoJob};
pub use poller::JobPoller;
pub use prompt::{build_cinematic_prompt, ScenarioAction, ScenarioStep, MAX_SCENE_CHARS};
pub use service::{GeneratedVideo, VideoService, VideoSource};

/// The environment variable name for the video API key.
pub const VIDEO_API_KEY_ENV: &str = "ZHIPUAI_API_KEY";

/// Default base URL for the video API.
pub const VIDEO_API_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Default model for video generation.
pub const VIDEO_DEFAULT_MODEL: &str = "cogvideox-flash";

/// Default interval between status checks (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of status checks before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
