//! Shared data models for the StoryReel pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Story identifiers and scene sets
//! - Job handles and status snapshots
//! - Artifact references and candidate storage keys
//! - Stage request payloads and the structured invocation response

pub mod artifact;
pub mod job;
pub mod request;
pub mod response;
pub mod scene;
pub mod story;

// Re-export common types
pub use artifact::{candidate_keys, ArtifactRef};
pub use job::{JobHandle, JobStatus, StatusSnapshot};
pub use request::{PipelineRequest, RequestError};
pub use response::{InvocationResponse, ResponseBody, SubJob};
pub use scene::{clean_scene_text, SceneSet, StoryMetadata, SCENE_COUNT};
pub use story::StoryId;
