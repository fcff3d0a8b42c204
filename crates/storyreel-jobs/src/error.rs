//! Monitoring error types.

use thiserror::Error;

/// A single status query against an external service failed.
///
/// One of these does not end a monitoring loop; it is logged and the
/// query is retried on the next scheduled poll. It only becomes terminal
/// when it lands on the final allowed attempt.
#[derive(Debug, Clone, Error)]
#[error("status query failed: {0}")]
pub struct StatusQueryError(pub String);

impl StatusQueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
