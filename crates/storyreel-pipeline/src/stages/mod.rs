//! Pipeline stages.
//!
//! Each stage submits work to one external service, waits on it through
//! the job monitor where the service is asynchronous, and verifies the
//! produced artifact through the locator before handing its key to the
//! next stage. The first stage to fail aborts the rest.

pub mod images;
pub mod merge;
pub mod narration;
pub mod story;
pub mod video;

use storyreel_jobs::MonitorOutcome;
use storyreel_storage::LocateOutcome;

use crate::error::{PipelineError, PipelineResult};

/// Convert a monitor outcome into the stage's success value or error.
pub(crate) fn require_completed(
    stage: &'static str,
    outcome: MonitorOutcome,
) -> PipelineResult<Option<String>> {
    match outcome {
        MonitorOutcome::Completed { output_ref } => Ok(output_ref),
        MonitorOutcome::Failed { status, message } => Err(PipelineError::JobFailed {
            stage,
            message: message.unwrap_or_else(|| format!("terminal status: {status}")),
        }),
        MonitorOutcome::TimedOut => Err(PipelineError::Timeout { stage }),
        MonitorOutcome::QueryFailed { message, .. } => {
            Err(PipelineError::StatusUnavailable { stage, message })
        }
    }
}

/// Convert a locate outcome into the found key or a not-found error
/// carrying every key that was checked.
pub(crate) fn require_found(
    stage: &'static str,
    outcome: LocateOutcome,
) -> PipelineResult<String> {
    match outcome {
        LocateOutcome::Found { key, .. } => Ok(key),
        LocateOutcome::NotFound { attempted } => Err(PipelineError::ArtifactNotFound {
            stage,
            attempted: attempted.into_iter().map(|a| a.key).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use storyreel_models::JobStatus;
    use storyreel_storage::CandidateAttempts;

    use super::*;

    #[test]
    fn test_require_completed_passes_output_ref() {
        let outcome = MonitorOutcome::Completed {
            output_ref: Some("s3://b/k.mp3".to_string()),
        };
        assert_eq!(
            require_completed("narration", outcome).unwrap().as_deref(),
            Some("s3://b/k.mp3")
        );
    }

    #[test]
    fn test_require_completed_maps_timeout() {
        let err = require_completed("video", MonitorOutcome::TimedOut).unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { stage: "video" }));
    }

    #[test]
    fn test_require_completed_defaults_failure_message() {
        let outcome = MonitorOutcome::Failed {
            status: JobStatus::Canceled,
            message: None,
        };
        let err = require_completed("merge", outcome).unwrap_err();
        assert!(err.to_string().contains("canceled"));
    }

    #[test]
    fn test_require_found_reports_attempted_keys() {
        let outcome = LocateOutcome::NotFound {
            attempted: vec![CandidateAttempts {
                key: "a/b.mp4".to_string(),
                attempts: 10,
            }],
        };
        let err = require_found("merge", outcome).unwrap_err();
        match err {
            PipelineError::ArtifactNotFound { attempted, .. } => {
                assert_eq!(attempted, vec!["a/b.mp4".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
