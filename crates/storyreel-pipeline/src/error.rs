//! Pipeline error types.
//!
//! Every variant maps to an HTTP-style status code at the invocation
//! boundary. `Timeout` is deliberately distinct from `JobFailed`: a timed
//! out job may still finish on the service side, a failed one will not.

use thiserror::Error;

use storyreel_models::RequestError;
use storyreel_services::ServiceError;
use storyreel_storage::StorageError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{stage} job failed: {message}")]
    JobFailed { stage: &'static str, message: String },

    #[error("{stage} monitoring timed out")]
    Timeout { stage: &'static str },

    #[error("{stage} status could not be determined: {message}")]
    StatusUnavailable { stage: &'static str, message: String },

    #[error("{stage} output not found; checked {}", attempted.join(", "))]
    ArtifactNotFound {
        stage: &'static str,
        attempted: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<RequestError> for PipelineError {
    fn from(err: RequestError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl PipelineError {
    pub fn job_failed(stage: &'static str, message: impl Into<String>) -> Self {
        Self::JobFailed {
            stage,
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP-style status code for the invocation response.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Terminal classification string for the response body.
    pub fn classification(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "invalid_request",
            PipelineError::JobFailed { .. } => "failed",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::StatusUnavailable { .. } => "error",
            PipelineError::ArtifactNotFound { .. } => "not_found",
            PipelineError::Config(_) | PipelineError::Service(_) | PipelineError::Storage(_) => {
                "error"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PipelineError::Validation("topic is required".into()).status_code(),
            400
        );
        assert_eq!(
            PipelineError::Timeout { stage: "video" }.status_code(),
            500
        );
        assert_eq!(
            PipelineError::job_failed("merge", "1404").status_code(),
            500
        );
    }

    #[test]
    fn test_timeout_classified_apart_from_failure() {
        assert_eq!(
            PipelineError::Timeout { stage: "video" }.classification(),
            "timeout"
        );
        assert_eq!(
            PipelineError::job_failed("video", "boom").classification(),
            "failed"
        );
    }

    #[test]
    fn test_not_found_lists_attempts() {
        let err = PipelineError::ArtifactNotFound {
            stage: "merge",
            attempted: vec!["a/b.mp4".into(), "a/b.mp4.mp4".into()],
        };
        let text = err.to_string();
        assert!(text.contains("a/b.mp4"));
        assert!(text.contains("a/b.mp4.mp4"));
    }
}
