//! Video job snapshot as reported by the backend.

/// Lifecycle status of an asynchronous video job.
///
/// `Queued` and `Processing` are transient; `Success` and `Fail` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Success,
    Fail,
}

impl JobStatus {
    /// Map a backend status string onto a status.
    ///
    /// Returns `None` for strings the backend is not documented to send.
    pub fn from_wire(status: &str) -> Option<Self> {
        match status.trim().to_uppercase().as_str() {
            "QUEUED" | "QUEUEING" => Some(JobStatus::Queued),
            "PROCESSING" => Some(JobStatus::Processing),
            "SUCCESS" => Some(JobStatus::Success),
            "FAIL" => Some(JobStatus::Fail),
            _ => None,
        }
    }
}

/// One observation of a job. The poller only reads these.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoJob {
    pub id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
}

impl VideoJob {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            result_url: None,
        }
    }

    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        self.result_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_literals() {
        assert_eq!(JobStatus::from_wire("QUEUED"), Some(JobStatus::Queued));
        assert_eq!(JobStatus::from_wire("PROCESSING"), Some(JobStatus::Processing));
        assert_eq!(JobStatus::from_wire("SUCCESS"), Some(JobStatus::Success));
        assert_eq!(JobStatus::from_wire("FAIL"), Some(JobStatus::Fail));
        assert_eq!(JobStatus::from_wire("processing"), Some(JobStatus::Processing));
        assert_eq!(JobStatus::from_wire("DONE"), None);
    }
}
