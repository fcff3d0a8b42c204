//! Job handles and status classification for asynchronous external services.

use serde::{Deserialize, Serialize};

/// Opaque reference to a submitted asynchronous unit of work.
///
/// The wrapped string is whatever the producing service hands back:
/// an invocation ARN, a synthesis task id, a transcode job id. A handle
/// is owned by one invocation and discarded once a terminal status is
/// obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

impl From<String> for JobHandle {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

/// Classified status of an asynchronous job.
///
/// Each service maps its own raw status strings into this set. Raw
/// values a service adapter does not recognize map to [`JobStatus::Error`]
/// so they classify as terminal rather than stalling a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted but not yet started
    Pending,
    /// Actively being processed
    InProgress,
    /// Finished successfully
    Completed,
    /// The service reported a failure
    Failed,
    /// Canceled before completion
    Canceled,
    /// Monitoring gave up while the job was still running
    Timeout,
    /// Status could not be determined or was not recognized
    Error,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Timeout => "timeout",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One observation of a job's state, as reported by its status service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Classified status
    pub status: JobStatus,
    /// Output location reported alongside the status, if any
    pub output_ref: Option<String>,
    /// Service-provided failure reason or raw unrecognized status text
    pub message: Option<String>,
}

impl StatusSnapshot {
    /// Snapshot with no output location or message.
    pub fn of(status: JobStatus) -> Self {
        Self {
            status,
            output_ref: None,
            message: None,
        }
    }

    /// Attach an output location.
    pub fn with_output(mut self, output_ref: impl Into<String>) -> Self {
        self.output_ref = Some(output_ref.into());
        self
    }

    /// Attach a failure reason or diagnostic message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_handle_display() {
        let handle = JobHandle::new("arn:aws:bedrock:us-east-1:123:async-invoke/abc123");
        assert_eq!(
            handle.to_string(),
            "arn:aws:bedrock:us-east-1:123:async-invoke/abc123"
        );
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: JobStatus = serde_json::from_str("\"timeout\"").unwrap();
        assert_eq!(status, JobStatus::Timeout);
    }

    #[test]
    fn test_snapshot_builders() {
        let snapshot = StatusSnapshot::of(JobStatus::Completed).with_output("s3://bucket/key.mp4");
        assert_eq!(snapshot.status, JobStatus::Completed);
        assert_eq!(snapshot.output_ref.as_deref(), Some("s3://bucket/key.mp4"));
        assert!(snapshot.message.is_none());
    }
}
