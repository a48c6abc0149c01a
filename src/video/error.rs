//! Errors that can occur during video generation.

/// Errors raised while submitting or polling a video job.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    #[error("Could not start video job: {0}")]
    Submission(String),

    #[error("Job {job_id} reported success without a video URL")]
    InconsistentState { job_id: String },

    #[error("Job {job_id} failed on the backend")]
    JobFailed { job_id: String },

    #[error("Job {job_id} did not finish after {attempts} polls")]
    Timeout { job_id: String, attempts: u32 },

    #[error("Status of job {job_id} unavailable after {streak} consecutive errors: {last_error}")]
    StatusUnavailable {
        job_id: String,
        streak: u32,
        last_error: String,
    },
}
