//! Pipeline configuration.

use std::time::Duration;

use storyreel_models::ArtifactRef;
use storyreel_services::BedrockModels;

use crate::error::{PipelineError, PipelineResult};

/// Polling parameters for one kind of monitored job.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_wait: Duration,
    pub max_attempts: Option<u32>,
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bucket holding scene data and images
    pub source_bucket: String,
    /// Bucket receiving video, narration, and the final output
    pub destination_bucket: String,
    /// AWS region
    pub region: String,
    /// MediaConvert endpoint override; discovered when unset
    pub mediaconvert_endpoint: Option<String>,
    /// IAM role MediaConvert jobs run as
    pub mediaconvert_role_arn: String,
    /// Bedrock model ids per stage
    pub models: BedrockModels,
    /// Narration voice
    pub voice: String,
    /// Video synthesis polling (time-bounded)
    pub video_poll: PollSettings,
    /// Narration polling (attempt-bounded)
    pub narration_poll: PollSettings,
    /// Transcode polling (attempt-bounded)
    pub merge_poll: PollSettings,
    /// Existence checks per candidate key when locating artifacts
    pub locate_attempts: u32,
    /// Delay between existence checks
    pub locate_delay: Duration,
    /// Spacing between per-scene image model calls
    pub image_spacing: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_bucket: String::new(),
            destination_bucket: String::new(),
            region: "us-east-1".to_string(),
            mediaconvert_endpoint: None,
            mediaconvert_role_arn: String::new(),
            models: BedrockModels::default(),
            voice: "Ruth".to_string(),
            video_poll: PollSettings {
                interval: Duration::from_secs(15),
                max_wait: Duration::from_secs(900),
                max_attempts: None,
            },
            narration_poll: PollSettings {
                interval: Duration::from_secs(10),
                max_wait: Duration::from_secs(900),
                max_attempts: Some(60),
            },
            merge_poll: PollSettings {
                interval: Duration::from_secs(10),
                max_wait: Duration::from_secs(900),
                max_attempts: Some(30),
            },
            locate_attempts: 10,
            locate_delay: Duration::from_secs(5),
            image_spacing: Duration::from_secs(2),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    ///
    /// The two bucket names are required; everything else falls back to
    /// the defaults above.
    pub fn from_env() -> PipelineResult<Self> {
        let defaults = Self::default();

        let source_bucket = std::env::var("SOURCE_BUCKET")
            .map_err(|_| PipelineError::config("SOURCE_BUCKET not set"))?;
        let destination_bucket = std::env::var("DESTINATION_BUCKET")
            .map_err(|_| PipelineError::config("DESTINATION_BUCKET not set"))?;

        let models = BedrockModels {
            text_model_id: env_or("TEXT_MODEL_ID", &defaults.models.text_model_id),
            image_model_id: env_or("IMAGE_MODEL_ID", &defaults.models.image_model_id),
            video_model_id: env_or("VIDEO_MODEL_ID", &defaults.models.video_model_id),
        };

        Ok(Self {
            source_bucket,
            destination_bucket,
            region: env_or("AWS_REGION", &defaults.region),
            mediaconvert_endpoint: std::env::var("MEDIACONVERT_ENDPOINT").ok(),
            mediaconvert_role_arn: std::env::var("MEDIACONVERT_ROLE_ARN").unwrap_or_default(),
            models,
            voice: env_or("NARRATION_VOICE", &defaults.voice),
            video_poll: PollSettings {
                interval: env_secs("VIDEO_POLL_INTERVAL_SECS", defaults.video_poll.interval),
                max_wait: env_secs("MAX_MONITORING_TIME_SECS", defaults.video_poll.max_wait),
                max_attempts: None,
            },
            narration_poll: PollSettings {
                interval: env_secs(
                    "NARRATION_POLL_INTERVAL_SECS",
                    defaults.narration_poll.interval,
                ),
                max_wait: defaults.narration_poll.max_wait,
                max_attempts: Some(env_u32(
                    "NARRATION_POLL_MAX_ATTEMPTS",
                    defaults.narration_poll.max_attempts.unwrap_or(60),
                )),
            },
            merge_poll: PollSettings {
                interval: env_secs("MERGE_POLL_INTERVAL_SECS", defaults.merge_poll.interval),
                max_wait: defaults.merge_poll.max_wait,
                max_attempts: Some(env_u32(
                    "MERGE_POLL_MAX_ATTEMPTS",
                    defaults.merge_poll.max_attempts.unwrap_or(30),
                )),
            },
            locate_attempts: env_u32("LOCATE_MAX_ATTEMPTS", defaults.locate_attempts),
            locate_delay: env_secs("LOCATE_RETRY_DELAY_SECS", defaults.locate_delay),
            image_spacing: defaults.image_spacing,
        })
    }

    /// Reference to a key in the source bucket.
    pub fn source_artifact(&self, key: &str) -> ArtifactRef {
        ArtifactRef::new(&self.source_bucket, key)
    }

    /// Reference to a key in the destination bucket.
    pub fn dest_artifact(&self, key: &str) -> ArtifactRef {
        ArtifactRef::new(&self.destination_bucket, key)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_artifact_uris() {
        let config = PipelineConfig {
            source_bucket: "stories-in".to_string(),
            destination_bucket: "stories-out".to_string(),
            ..Default::default()
        };

        assert_eq!(
            config.source_artifact("abc/scene_1.png").s3_uri(),
            "s3://stories-in/abc/scene_1.png"
        );
        assert_eq!(
            config.dest_artifact("abc/final/final_output.mp4").s3_uri(),
            "s3://stories-out/abc/final/final_output.mp4"
        );
    }

    // One test owns every env var it touches; nothing else in the crate
    // reads the environment during tests.
    #[test]
    fn test_from_env_poll_overrides() {
        let vars = [
            ("SOURCE_BUCKET", "in"),
            ("DESTINATION_BUCKET", "out"),
            ("NARRATION_POLL_INTERVAL_SECS", "3"),
            ("NARRATION_POLL_MAX_ATTEMPTS", "7"),
            ("MERGE_POLL_INTERVAL_SECS", "4"),
            ("MERGE_POLL_MAX_ATTEMPTS", "9"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let config = PipelineConfig::from_env().unwrap();

        for (key, _) in vars {
            std::env::remove_var(key);
        }

        assert_eq!(config.narration_poll.interval, Duration::from_secs(3));
        assert_eq!(config.narration_poll.max_attempts, Some(7));
        assert_eq!(config.merge_poll.interval, Duration::from_secs(4));
        assert_eq!(config.merge_poll.max_attempts, Some(9));
        // Untouched settings keep their defaults.
        assert_eq!(config.video_poll.interval, Duration::from_secs(15));
        assert_eq!(config.locate_attempts, 10);
    }
}
