//! StoryReel pipeline orchestration.
//!
//! Sequences the generative stages (story text, scene images, video
//! synthesis, narration, mux) over the monitor/locator core, and maps
//! every failure to a structured invocation response.

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod stages;

pub use config::{PipelineConfig, PollSettings};
pub use error::{PipelineError, PipelineResult};
pub use logging::StageLogger;
pub use orchestrator::{Pipeline, PipelineContext, RunRecord};
