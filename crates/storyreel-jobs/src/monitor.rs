//! Polling monitor for asynchronous jobs.
//!
//! Submitting work to a managed inference or transcoding service returns a
//! handle, not a result; the only way to learn the outcome is to poll a
//! status endpoint until the job leaves its in-progress state. This module
//! owns that loop: it sleeps between polls, enforces a wall-clock ceiling
//! and an optional attempt ceiling, and classifies the first non-waiting
//! status it observes as terminal.
//!
//! Any status outside the configured wait set is terminal, including ones
//! the service adapter did not recognize. This trades a possible early
//! exit on a transient oddball status for never hanging on an unexpected
//! service response; there is no allow-list of known terminal states to
//! drift out of date.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use storyreel_models::{JobStatus, StatusSnapshot};

use crate::error::StatusQueryError;

/// Pull-based status endpoint for one kind of asynchronous job.
///
/// Implementations query the external service once per call and map its
/// raw status into a [`StatusSnapshot`]. Queries must be read-only and
/// idempotent; the monitor may issue many of them for one handle.
pub trait StatusSource {
    /// Handle type identifying one submitted job.
    type Handle: ?Sized;

    /// Query the current status of a job.
    fn status(
        &self,
        handle: &Self::Handle,
    ) -> impl std::future::Future<Output = Result<StatusSnapshot, StatusQueryError>>;
}

/// Configuration for one monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Delay between status queries.
    pub poll_interval: Duration,
    /// Wall-clock ceiling; exceeding it while still waiting yields `TimedOut`.
    pub max_wait: Duration,
    /// Optional ceiling on status queries, independent of elapsed time.
    pub max_attempts: Option<u32>,
    /// Statuses that mean "still running"; anything else is terminal.
    pub wait_on: Vec<JobStatus>,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            max_wait: Duration::from_secs(900),
            max_attempts: None,
            wait_on: vec![JobStatus::Pending, JobStatus::InProgress],
            operation_name: "job".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Create a new monitor config with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    fn is_waiting(&self, status: JobStatus) -> bool {
        self.wait_on.contains(&status)
    }
}

/// One status check, kept only long enough to log it and decide the next step.
#[derive(Debug, Clone)]
pub struct PollAttempt {
    /// 1-based attempt number
    pub attempt: u32,
    /// Status observed on this attempt, if the query succeeded
    pub observed: Option<JobStatus>,
    /// Elapsed time since monitoring started
    pub elapsed: Duration,
}

/// Terminal classification of one monitored job.
///
/// Exactly one of these is produced per call to [`monitor_job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The job finished successfully.
    Completed {
        /// Output location reported by the status endpoint, if any
        output_ref: Option<String>,
    },
    /// The job reached a non-success terminal status.
    Failed {
        status: JobStatus,
        message: Option<String>,
    },
    /// The wait ceiling was reached while the job was still running.
    /// Distinct from `Failed`: the job may yet finish on the service side.
    TimedOut,
    /// The status query itself failed on the final allowed attempt.
    QueryFailed { message: String, attempts: u32 },
}

impl MonitorOutcome {
    /// Terminal status equivalent of this outcome.
    pub fn status(&self) -> JobStatus {
        match self {
            MonitorOutcome::Completed { .. } => JobStatus::Completed,
            MonitorOutcome::Failed { status, .. } => *status,
            MonitorOutcome::TimedOut => JobStatus::Timeout,
            MonitorOutcome::QueryFailed { .. } => JobStatus::Error,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, MonitorOutcome::Completed { .. })
    }
}

/// Poll a job until it reaches a terminal status or a ceiling is hit.
///
/// The loop queries, classifies, and only then sleeps, so no sleep ever
/// follows a terminal observation. A failed query is logged and retried on
/// the next scheduled poll unless it lands on the final allowed attempt,
/// in which case it becomes a [`MonitorOutcome::QueryFailed`]. The monitor
/// returns within `max_wait` plus at most one poll interval.
pub async fn monitor_job<S>(
    source: &S,
    handle: &S::Handle,
    config: &MonitorConfig,
) -> MonitorOutcome
where
    S: StatusSource,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let final_attempt = config.max_attempts.is_some_and(|max| attempt >= max);

        match source.status(handle).await {
            Ok(snapshot) => {
                let poll = PollAttempt {
                    attempt,
                    observed: Some(snapshot.status),
                    elapsed: started.elapsed(),
                };
                debug!(
                    operation = %config.operation_name,
                    attempt = poll.attempt,
                    status = %snapshot.status,
                    elapsed_ms = poll.elapsed.as_millis() as u64,
                    "poll"
                );

                if !config.is_waiting(snapshot.status) {
                    return match snapshot.status {
                        JobStatus::Completed => MonitorOutcome::Completed {
                            output_ref: snapshot.output_ref,
                        },
                        status => MonitorOutcome::Failed {
                            status,
                            message: snapshot.message,
                        },
                    };
                }
            }
            Err(e) if final_attempt => {
                warn!(
                    operation = %config.operation_name,
                    attempt,
                    "status query failed on final attempt: {e}"
                );
                return MonitorOutcome::QueryFailed {
                    message: e.to_string(),
                    attempts: attempt,
                };
            }
            Err(e) => {
                warn!(
                    operation = %config.operation_name,
                    attempt,
                    "status query failed, retrying on next poll: {e}"
                );
            }
        }

        if final_attempt {
            warn!(
                operation = %config.operation_name,
                attempts = attempt,
                "attempt ceiling reached while still waiting"
            );
            return MonitorOutcome::TimedOut;
        }

        // Another poll would land past the wall-clock ceiling.
        if started.elapsed() + config.poll_interval > config.max_wait {
            warn!(
                operation = %config.operation_name,
                attempts = attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "maximum monitoring time exceeded"
            );
            return MonitorOutcome::TimedOut;
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}
