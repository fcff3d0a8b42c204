//! S3 storage access for the StoryReel pipeline.
//!
//! This crate provides:
//! - Object upload/download and existence checks ([`S3Client`])
//! - The [`ObjectStore`] trait the locator polls through
//! - The artifact locator: bounded, ordered candidate-key search for
//!   outputs that services write at not-quite-predictable keys

pub mod client;
pub mod error;
pub mod locator;

pub use client::S3Client;
pub use error::{StorageError, StorageResult};
pub use locator::{ArtifactLocator, CandidateAttempts, LocateOutcome, LocatorConfig, ObjectStore};
