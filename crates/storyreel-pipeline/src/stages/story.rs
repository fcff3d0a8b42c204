//! Story generation: text model call plus scene/metadata upload.

use storyreel_jobs::{retry_async, RetryConfig};
use storyreel_models::{SceneSet, StoryId, StoryMetadata};

use crate::error::PipelineResult;
use crate::logging::StageLogger;
use crate::orchestrator::PipelineContext;

const STAGE: &str = "story";

/// In-memory results of the story stage, consumed by later stages.
#[derive(Debug, Clone)]
pub struct StoryAssets {
    pub story_id: StoryId,
    pub scenes: SceneSet,
    pub full_text: String,
}

impl StoryAssets {
    pub fn scenes_key(&self) -> String {
        format!("{}/scenes.json", self.story_id)
    }

    pub fn metadata_key(&self) -> String {
        format!("{}/metadata.json", self.story_id)
    }
}

/// Generate the story text, derive the scene set, and persist both.
pub async fn generate(ctx: &PipelineContext, topic: &str) -> PipelineResult<StoryAssets> {
    let story_id = StoryId::generate(topic);
    let log = StageLogger::new(&story_id, STAGE);
    log.start(&format!("generating story for topic: {topic}"));

    let full_text = retry_async(&RetryConfig::new("generate_story"), || {
        ctx.bedrock.generate_story(topic)
    })
    .await
    .into_result()?;

    let scenes = SceneSet::from_story_text(&full_text, topic);
    let assets = StoryAssets {
        story_id: story_id.clone(),
        scenes,
        full_text,
    };

    let metadata = StoryMetadata::new(
        story_id.clone(),
        topic,
        &assets.scenes,
        assets.full_text.clone(),
    );
    ctx.source.put_json(&metadata, &assets.metadata_key()).await?;
    ctx.source
        .put_json(&assets.scenes.to_shots_json(), &assets.scenes_key())
        .await?;

    log.done("scene descriptions and metadata stored");
    Ok(assets)
}
