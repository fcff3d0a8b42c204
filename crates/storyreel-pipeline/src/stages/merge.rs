//! Merge: MediaConvert mux job, monitored then located.

use storyreel_jobs::{monitor_job, MonitorConfig};
use storyreel_models::candidate_keys;
use storyreel_services::MergeJobSpec;
use storyreel_storage::{ArtifactLocator, LocatorConfig};

use crate::error::PipelineResult;
use crate::logging::StageLogger;
use crate::orchestrator::{PipelineContext, RunRecord};

use super::story::StoryAssets;
use super::{require_completed, require_found};

const STAGE: &str = "merge";

/// Mux the narration audio onto the rendered video and return the key of
/// the final output.
///
/// The destination prefix is extensionless; MediaConvert appends `.mp4`,
/// and has been observed to double it, so the located candidates start
/// from `<destination>.mp4`.
pub async fn merge(
    ctx: &PipelineContext,
    record: &mut RunRecord,
    story: &StoryAssets,
    video_key: &str,
    audio_key: &str,
) -> PipelineResult<String> {
    let log = StageLogger::new(&story.story_id, STAGE);

    let destination_key = format!("{}/final/final_output", story.story_id);
    let spec = MergeJobSpec {
        video_uri: ctx.dest_uri(video_key),
        audio_uri: ctx.dest_uri(audio_key),
        destination_uri: ctx.dest_uri(&destination_key),
    };

    let handle = ctx.mediaconvert.start_merge_job(&spec).await?;
    record.push_job(STAGE, handle.as_str());
    log.start(&format!("merge job {handle} submitted"));

    let monitor_config = MonitorConfig::new("merge_transcode")
        .with_poll_interval(ctx.config.merge_poll.interval)
        .with_max_wait(ctx.config.merge_poll.max_wait)
        .with_max_attempts(ctx.config.merge_poll.max_attempts.unwrap_or(30));
    let outcome = monitor_job(&ctx.mediaconvert, &handle, &monitor_config).await;
    require_completed(STAGE, outcome)?;

    let expected = format!("{destination_key}.mp4");
    log.progress(&format!("job complete, locating output at {expected}"));

    let locator = ArtifactLocator::new(
        &ctx.dest,
        LocatorConfig::new(ctx.config.locate_attempts, ctx.config.locate_delay),
    );
    let outcome = locator.locate(&candidate_keys(&expected)).await;
    let key = require_found(STAGE, outcome)?;

    record.push_artifact(ctx.dest_uri(&key));
    log.done(&format!("final output at {key}"));
    Ok(key)
}
