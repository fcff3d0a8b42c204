//! Async job monitoring for pull-based external services.
//!
//! This crate provides:
//! - The job monitor: sentinel-driven polling with wall-clock and
//!   attempt ceilings ([`monitor::monitor_job`])
//! - The [`monitor::StatusSource`] trait implemented by each service client
//! - A shared retry policy with exponential backoff ([`retry`])

pub mod error;
pub mod monitor;
pub mod retry;

pub use error::StatusQueryError;
pub use monitor::{monitor_job, MonitorConfig, MonitorOutcome, PollAttempt, StatusSource};
pub use retry::{retry_async, RetryConfig, RetryResult};
