//! Narration: async speech synthesis, monitored then located.

use chrono::Utc;

use storyreel_jobs::{monitor_job, retry_async, MonitorConfig, RetryConfig};
use storyreel_models::ArtifactRef;
use storyreel_storage::{ArtifactLocator, LocatorConfig};

use crate::error::PipelineResult;
use crate::logging::StageLogger;
use crate::orchestrator::{PipelineContext, RunRecord};

use super::story::StoryAssets;
use super::{require_completed, require_found};

const STAGE: &str = "narration";

/// Synthesize the narration audio and return its key in the destination
/// bucket.
///
/// The task reports its own output URI on completion (the service
/// appends a task-id suffix to the requested prefix); that reported key
/// is preferred, the conventional `<prefix>.mp3` kept as a fallback, and
/// whichever is used gets verified through the locator.
pub async fn narrate(
    ctx: &PipelineContext,
    record: &mut RunRecord,
    story: &StoryAssets,
) -> PipelineResult<String> {
    let log = StageLogger::new(&story.story_id, STAGE);

    let prefix = format!("{}/audio/speech_{}", story.story_id, Utc::now().timestamp());
    let task = retry_async(&RetryConfig::new("start_narration"), || {
        ctx.polly
            .start_narration(&story.full_text, &ctx.config.destination_bucket, &prefix)
    })
    .await
    .into_result()?;
    record.push_job(STAGE, task.handle.as_str());
    log.start(&format!("narration task {} submitted", task.handle));

    let monitor_config = MonitorConfig::new("narration_synthesis")
        .with_poll_interval(ctx.config.narration_poll.interval)
        .with_max_wait(ctx.config.narration_poll.max_wait)
        .with_max_attempts(ctx.config.narration_poll.max_attempts.unwrap_or(60));
    let outcome = monitor_job(&ctx.polly, &task.handle, &monitor_config).await;
    let output_ref = require_completed(STAGE, outcome)?;

    let reported = output_ref
        .as_deref()
        .and_then(|uri| key_from_output_uri(uri, &ctx.config.destination_bucket));
    if reported.is_none() {
        log.warning("task reported no usable output uri, relying on conventional key");
    }
    let fallback = format!("{prefix}.mp3");
    let mut candidates: Vec<String> = Vec::new();
    if let Some(key) = reported {
        candidates.push(key);
    }
    if !candidates.contains(&fallback) {
        candidates.push(fallback);
    }

    let locator = ArtifactLocator::new(
        &ctx.dest,
        LocatorConfig::new(ctx.config.locate_attempts, ctx.config.locate_delay),
    );
    let outcome = locator.locate(&candidates).await;
    let key = require_found(STAGE, outcome)?;

    record.push_artifact(ctx.dest_uri(&key));
    log.done(&format!("narration audio at {key}"));
    Ok(key)
}

/// Extract the object key from a task-reported output URI, which may be
/// an `https://` or `s3://` form; everything after the bucket segment is
/// the key.
fn key_from_output_uri(uri: &str, bucket: &str) -> Option<String> {
    if let Some(artifact) = ArtifactRef::parse_s3_uri(uri) {
        return (artifact.bucket == bucket).then_some(artifact.key);
    }

    let marker = format!("{bucket}/");
    uri.split_once(&marker)
        .map(|(_, key)| key.to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_https_uri() {
        let uri = "https://s3.us-east-1.amazonaws.com/stories-out/abc/audio/speech_1700000000.task1.mp3";
        assert_eq!(
            key_from_output_uri(uri, "stories-out").as_deref(),
            Some("abc/audio/speech_1700000000.task1.mp3")
        );
    }

    #[test]
    fn test_key_from_s3_uri() {
        assert_eq!(
            key_from_output_uri("s3://stories-out/abc/audio/x.mp3", "stories-out").as_deref(),
            Some("abc/audio/x.mp3")
        );
    }

    #[test]
    fn test_key_missing_bucket() {
        assert_eq!(key_from_output_uri("s3://other/abc.mp3", "stories-out"), None);
    }
}
