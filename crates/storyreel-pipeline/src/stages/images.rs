//! Scene image rendering: one synchronous image-model call per scene.

use storyreel_jobs::{retry_async, RetryConfig};
use storyreel_models::SceneSet;

use crate::error::PipelineResult;
use crate::logging::StageLogger;
use crate::orchestrator::PipelineContext;

use super::story::StoryAssets;

const STAGE: &str = "images";

/// Render and upload one image per scene, returning the keys in shot order.
///
/// Calls are spaced out to stay under the image model's rate limit; there
/// is no parallelism across scenes.
pub async fn render(
    ctx: &PipelineContext,
    story: &StoryAssets,
    style: Option<&str>,
) -> PipelineResult<Vec<String>> {
    let log = StageLogger::new(&story.story_id, STAGE);
    let mut keys = Vec::with_capacity(story.scenes.scenes().len());

    for (number, text) in story.scenes.numbered() {
        if number > 1 {
            tokio::time::sleep(ctx.config.image_spacing).await;
        }
        log.progress(&format!(
            "rendering image {number}/{}",
            story.scenes.scenes().len()
        ));

        let png = retry_async(&RetryConfig::new("generate_image"), || {
            ctx.bedrock.generate_image(text, style)
        })
        .await
        .into_result()?;

        let key = SceneSet::image_key(&story.story_id, number);
        ctx.source.put_bytes(png, &key, "image/png").await?;
        keys.push(key);
    }

    log.done(&format!("{} scene images stored", keys.len()));
    Ok(keys)
}
