//! Pipeline orchestrator: sequential stage composition with
//! error short-circuiting.

use aws_config::{BehaviorVersion, Region};
use tracing::{error, info};

use storyreel_models::{InvocationResponse, PipelineRequest, ResponseBody, StoryId, SubJob};
use storyreel_services::{BedrockClient, MediaConvertClient, PollyClient};
use storyreel_storage::S3Client;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::stages;

/// Service clients and configuration for one invocation.
///
/// Clients are constructed here and passed down explicitly; nothing is
/// held in module-level state.
pub struct PipelineContext {
    pub config: PipelineConfig,
    /// Bucket holding scene data and images
    pub source: S3Client,
    /// Bucket receiving video, narration, and the final output
    pub dest: S3Client,
    pub bedrock: BedrockClient,
    pub polly: PollyClient,
    pub mediaconvert: MediaConvertClient,
}

impl PipelineContext {
    /// Build a context from environment configuration.
    pub async fn from_env() -> PipelineResult<Self> {
        let config = PipelineConfig::from_env()?;
        if config.mediaconvert_role_arn.is_empty() {
            return Err(PipelineError::config("MEDIACONVERT_ROLE_ARN not set"));
        }

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let source = S3Client::new(&sdk_config, &config.source_bucket);
        let dest = S3Client::new(&sdk_config, &config.destination_bucket);
        let bedrock = BedrockClient::new(&sdk_config, config.models.clone());
        let polly = PollyClient::new(&sdk_config, &config.voice);
        let mediaconvert = MediaConvertClient::new(
            &sdk_config,
            config.mediaconvert_endpoint.clone(),
            &config.mediaconvert_role_arn,
        )
        .await?;

        Ok(Self {
            config,
            source,
            dest,
            bedrock,
            polly,
            mediaconvert,
        })
    }

    /// `s3://` URI for a key in the destination bucket.
    pub fn dest_uri(&self, key: &str) -> String {
        self.config.dest_artifact(key).s3_uri()
    }
}

/// What one invocation has started and produced so far.
///
/// Kept outside the stage results so a failing invocation still reports
/// the sub-jobs it launched and the artifacts that did land.
#[derive(Debug, Default)]
pub struct RunRecord {
    pub story_id: Option<StoryId>,
    pub jobs: Vec<SubJob>,
    pub artifacts: Vec<String>,
}

impl RunRecord {
    pub fn push_job(&mut self, stage: &str, job_id: &str) {
        self.jobs.push(SubJob {
            stage: stage.to_string(),
            job_id: job_id.to_string(),
        });
    }

    pub fn push_artifact(&mut self, uri: String) {
        self.artifacts.push(uri);
    }
}

/// The pipeline: story text, scene images, video synthesis, narration,
/// and the final mux, in that order.
pub struct Pipeline {
    ctx: PipelineContext,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// Run one invocation to a structured response.
    ///
    /// All errors are converted here; this function does not fail.
    pub async fn run(&self, request: PipelineRequest) -> InvocationResponse {
        let mut record = RunRecord::default();

        match self.execute(&request, &mut record).await {
            Ok(final_key) => {
                info!(final_key = %final_key, "pipeline completed");
                success_response(&record)
            }
            Err(e) => {
                error!(
                    story_id = record.story_id.as_ref().map(|id| id.as_str()).unwrap_or("-"),
                    jobs = record.jobs.len(),
                    "pipeline failed: {e}"
                );
                failure_response(&e, &record)
            }
        }
    }

    async fn execute(
        &self,
        request: &PipelineRequest,
        record: &mut RunRecord,
    ) -> PipelineResult<String> {
        request.check()?;

        let story = stages::story::generate(&self.ctx, &request.topic).await?;
        record.story_id = Some(story.story_id.clone());

        let image_keys =
            stages::images::render(&self.ctx, &story, request.style.as_deref()).await?;

        let video_key = stages::video::synthesize(&self.ctx, record, &story, &image_keys).await?;
        let audio_key = stages::narration::narrate(&self.ctx, record, &story).await?;
        stages::merge::merge(&self.ctx, record, &story, &video_key, &audio_key).await
    }
}

fn success_response(record: &RunRecord) -> InvocationResponse {
    let mut body = ResponseBody::new("Processing completed successfully");
    body.story_id = record.story_id.as_ref().map(|id| id.to_string());
    body.status = Some("completed".to_string());
    body.jobs = record.jobs.clone();
    body.artifacts = record.artifacts.clone();
    InvocationResponse::ok(body)
}

fn failure_response(error: &PipelineError, record: &RunRecord) -> InvocationResponse {
    if error.status_code() == 400 {
        return InvocationResponse::bad_request(error.to_string());
    }

    let mut body = ResponseBody::new(error.to_string());
    body.story_id = record.story_id.as_ref().map(|id| id.to_string());
    body.status = Some(error.classification().to_string());
    body.jobs = record.jobs.clone();
    body.artifacts = record.artifacts.clone();
    body.error = Some(error.to_string());
    if let PipelineError::ArtifactNotFound { attempted, .. } = error {
        body.attempted_paths = attempted.clone();
    }
    InvocationResponse::server_error(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_job() -> RunRecord {
        let mut record = RunRecord {
            story_id: Some(StoryId::from_existing("20250101_foxes_abc123")),
            ..Default::default()
        };
        record.push_job("video", "job-9");
        record
    }

    #[test]
    fn test_success_response_shape() {
        let mut record = record_with_job();
        record.push_artifact("s3://out/20250101_foxes_abc123/final/final_output.mp4".to_string());

        let response = success_response(&record);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.status.as_deref(), Some("completed"));
        assert_eq!(response.body.jobs.len(), 1);
        assert_eq!(response.body.artifacts.len(), 1);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let error = PipelineError::Validation("topic: topic is required".to_string());
        let response = failure_response(&error, &RunRecord::default());
        assert_eq!(response.status_code, 400);
    }

    #[test]
    fn test_failure_keeps_started_jobs() {
        let error = PipelineError::Timeout { stage: "video" };
        let response = failure_response(&error, &record_with_job());

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.status.as_deref(), Some("timeout"));
        assert_eq!(response.body.jobs[0].job_id, "job-9");
        assert_eq!(
            response.body.story_id.as_deref(),
            Some("20250101_foxes_abc123")
        );
    }

    #[test]
    fn test_not_found_response_lists_paths() {
        let error = PipelineError::ArtifactNotFound {
            stage: "merge",
            attempted: vec!["a/final_output.mp4".to_string(), "a/final_output.mp4.mp4".to_string()],
        };
        let response = failure_response(&error, &record_with_job());
        assert_eq!(response.body.attempted_paths.len(), 2);
    }
}
