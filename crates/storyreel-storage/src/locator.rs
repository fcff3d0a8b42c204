//! Artifact locator: bounded search across candidate storage keys.
//!
//! A job reporting `Completed` does not guarantee its output is visible
//! yet, or that it landed at the requested key. The locator walks an
//! ordered candidate list, giving each key a fixed number of existence
//! checks with a fixed delay between them, and returns the first key that
//! resolves. Callers get a working path even when the producing service
//! drifted from the requested layout; the cost is that a genuinely failed
//! upstream job surfaces here as "not found" rather than as its own error.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::StorageResult;

/// Read-only existence checks against one bucket.
///
/// Checks must be idempotent; the locator issues many of them per key.
pub trait ObjectStore {
    fn exists(&self, key: &str) -> impl std::future::Future<Output = StorageResult<bool>>;
}

/// Configuration for one locate operation.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Existence checks per candidate key.
    pub max_attempts: u32,
    /// Fixed delay between checks of the same candidate.
    pub retry_delay: Duration,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl LocatorConfig {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
        }
    }
}

/// Checks made against one candidate key before giving up on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAttempts {
    pub key: String,
    pub attempts: u32,
}

/// Result of a locate operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// An object was found; `key` may differ from the first candidate.
    Found { key: String, attempts: u32 },
    /// Every candidate was exhausted; all checked keys are reported.
    NotFound { attempted: Vec<CandidateAttempts> },
}

impl LocateOutcome {
    pub fn found_key(&self) -> Option<&str> {
        match self {
            LocateOutcome::Found { key, .. } => Some(key),
            LocateOutcome::NotFound { .. } => None,
        }
    }
}

/// Bounded existence search over ordered candidate keys.
pub struct ArtifactLocator<'a, S: ObjectStore> {
    store: &'a S,
    config: LocatorConfig,
}

impl<'a, S: ObjectStore> ArtifactLocator<'a, S> {
    pub fn new(store: &'a S, config: LocatorConfig) -> Self {
        Self { store, config }
    }

    /// Search the candidates in order; the first key that exists wins.
    ///
    /// A failed existence check counts as an attempt and is retried after
    /// the configured delay; it is logged but never conflated with a
    /// definite "not found". No delay follows the final attempt against a
    /// candidate before moving to the next one.
    pub async fn locate(&self, candidates: &[String]) -> LocateOutcome {
        let mut attempted = Vec::with_capacity(candidates.len());

        for key in candidates {
            for attempt in 1..=self.config.max_attempts {
                match self.store.exists(key).await {
                    Ok(true) => {
                        info!(key = %key, attempt, "artifact found");
                        return LocateOutcome::Found {
                            key: key.clone(),
                            attempts: attempt,
                        };
                    }
                    Ok(false) => {
                        debug!(key = %key, attempt, "artifact not visible yet");
                    }
                    Err(e) => {
                        warn!(key = %key, attempt, "existence check failed: {e}");
                    }
                }

                if attempt < self.config.max_attempts {
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }

            attempted.push(CandidateAttempts {
                key: key.clone(),
                attempts: self.config.max_attempts,
            });
        }

        warn!(
            candidates = attempted.len(),
            "artifact not found at any candidate key"
        );
        LocateOutcome::NotFound { attempted }
    }
}
