//! Clients for the managed services the pipeline drives.
//!
//! This crate provides:
//! - Bedrock runtime: story text, scene images, and async video synthesis
//! - Polly: asynchronous speech-synthesis tasks
//! - MediaConvert: audio/video mux jobs with endpoint discovery
//!
//! Each client is constructed from an injected SDK config and implements
//! [`storyreel_jobs::StatusSource`] for the jobs it submits, so one
//! monitor drives all of them.

pub mod bedrock;
pub mod error;
pub mod mediaconvert;
pub mod polly;

pub use bedrock::{BedrockClient, BedrockModels, VideoJob, VideoShot};
pub use error::{ServiceError, ServiceResult};
pub use mediaconvert::{MediaConvertClient, MergeJobSpec};
pub use polly::{NarrationTask, PollyClient};
