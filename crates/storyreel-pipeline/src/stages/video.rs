//! Video synthesis: async multi-shot job, monitored then located.

use storyreel_jobs::{monitor_job, MonitorConfig};
use storyreel_models::candidate_keys;
use storyreel_services::VideoShot;
use storyreel_storage::{ArtifactLocator, LocatorConfig};

use crate::error::PipelineResult;
use crate::logging::StageLogger;
use crate::orchestrator::{PipelineContext, RunRecord};

use super::story::StoryAssets;
use super::{require_completed, require_found};

const STAGE: &str = "video";

/// Submit the multi-shot video job, wait for it, and return the key of
/// the rendered video in the destination bucket.
///
/// The service writes under a job-id prefix of the requested output URI,
/// so the expected key is derived from the returned job id and then
/// verified through the locator rather than trusted.
pub async fn synthesize(
    ctx: &PipelineContext,
    record: &mut RunRecord,
    story: &StoryAssets,
    image_keys: &[String],
) -> PipelineResult<String> {
    let log = StageLogger::new(&story.story_id, STAGE);

    let shots: Vec<VideoShot> = story
        .scenes
        .numbered()
        .zip(image_keys)
        .map(|((_, text), key)| VideoShot {
            text: text.to_string(),
            image_uri: ctx.config.source_artifact(key).s3_uri(),
        })
        .collect();

    let output_prefix = format!(
        "s3://{}/{}/",
        ctx.config.destination_bucket, story.story_id
    );
    let job = ctx.bedrock.start_video_job(&shots, &output_prefix).await?;
    record.push_job(STAGE, &job.job_id);
    log.start(&format!("video job {} submitted", job.job_id));

    let monitor_config = MonitorConfig::new("video_synthesis")
        .with_poll_interval(ctx.config.video_poll.interval)
        .with_max_wait(ctx.config.video_poll.max_wait);
    let outcome = monitor_job(&ctx.bedrock, &job.handle, &monitor_config).await;
    require_completed(STAGE, outcome)?;

    let expected = format!("{}/{}/output.mp4", story.story_id, job.job_id);
    log.progress(&format!("job complete, locating output at {expected}"));

    let locator = ArtifactLocator::new(
        &ctx.dest,
        LocatorConfig::new(ctx.config.locate_attempts, ctx.config.locate_delay),
    );
    let outcome = locator.locate(&candidate_keys(&expected)).await;
    let key = require_found(STAGE, outcome)?;

    record.push_artifact(ctx.dest_uri(&key));
    log.done(&format!("rendered video at {key}"));
    Ok(key)
}
