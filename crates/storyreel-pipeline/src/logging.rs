//! Structured stage logging.
//!
//! Stages log lifecycle events with the story id and stage name attached
//! so one invocation's lines can be followed across services.

use tracing::{info, warn};

use storyreel_models::StoryId;

/// Logger carrying the invocation context for one stage.
#[derive(Debug, Clone)]
pub struct StageLogger {
    story_id: String,
    stage: &'static str,
}

impl StageLogger {
    pub fn new(story_id: &StoryId, stage: &'static str) -> Self {
        Self {
            story_id: story_id.to_string(),
            stage,
        }
    }

    pub fn start(&self, message: &str) {
        info!(story_id = %self.story_id, stage = %self.stage, "{message}");
    }

    pub fn progress(&self, message: &str) {
        info!(story_id = %self.story_id, stage = %self.stage, "{message}");
    }

    pub fn warning(&self, message: &str) {
        warn!(story_id = %self.story_id, stage = %self.stage, "{message}");
    }

    pub fn done(&self, message: &str) {
        info!(story_id = %self.story_id, stage = %self.stage, "{message}");
    }
}
