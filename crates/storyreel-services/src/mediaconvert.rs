//! MediaConvert client for muxing narration audio onto rendered video.
//!
//! MediaConvert is account-endpoint based: unless an endpoint override is
//! configured, the client discovers its endpoint once at construction.
//! Jobs write to a destination prefix without an extension; the service
//! appends one, which is exactly the layout drift the artifact locator's
//! candidate keys exist for.

use aws_sdk_mediaconvert::types::{
    AacCodingMode, AacSettings, AudioCodec, AudioCodecSettings, AudioDefaultSelection,
    AudioDescription, AudioNormalizationAlgorithm, AudioNormalizationAlgorithmControl,
    AudioNormalizationSettings, AudioSelector, ContainerSettings, ContainerType,
    FileGroupSettings, H264RateControlMode, H264SceneChangeDetect, H264Settings, Input,
    InputTimecodeSource, JobSettings, Mp4Settings, Output, OutputGroup, OutputGroupSettings,
    OutputGroupType, TimecodeConfig, TimecodeSource, VideoCodec, VideoCodecSettings,
    VideoDescription, VideoSelector,
};
use aws_sdk_mediaconvert::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use storyreel_jobs::{StatusQueryError, StatusSource};
use storyreel_models::{JobHandle, JobStatus, StatusSnapshot};

use crate::error::{ServiceError, ServiceResult};

const VIDEO_MAX_BITRATE: i32 = 5_000_000;
const AUDIO_BITRATE: i32 = 96_000;
const AUDIO_SAMPLE_RATE: i32 = 48_000;
const AUDIO_TARGET_LKFS: f64 = -23.0;

/// Inputs for one mux job.
#[derive(Debug, Clone)]
pub struct MergeJobSpec {
    /// `s3://` URI of the rendered video
    pub video_uri: String,
    /// `s3://` URI of the narration audio
    pub audio_uri: String,
    /// `s3://` destination prefix, extensionless
    pub destination_uri: String,
}

/// MediaConvert client bound to its account endpoint.
pub struct MediaConvertClient {
    client: Client,
    role_arn: String,
}

impl MediaConvertClient {
    /// Create a client, discovering the account endpoint unless an
    /// override is supplied.
    pub async fn new(
        sdk_config: &SdkConfig,
        endpoint_override: Option<String>,
        role_arn: impl Into<String>,
    ) -> ServiceResult<Self> {
        let endpoint = match endpoint_override {
            Some(url) => url,
            None => Self::discover_endpoint(sdk_config).await?,
        };
        debug!(endpoint = %endpoint, "mediaconvert endpoint resolved");

        let config = aws_sdk_mediaconvert::config::Builder::from(sdk_config)
            .endpoint_url(endpoint)
            .build();

        Ok(Self {
            client: Client::from_conf(config),
            role_arn: role_arn.into(),
        })
    }

    async fn discover_endpoint(sdk_config: &SdkConfig) -> ServiceResult<String> {
        let client = Client::new(sdk_config);
        let response = client
            .describe_endpoints()
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        response
            .endpoints()
            .first()
            .and_then(|endpoint| endpoint.url())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::invalid_response("no mediaconvert endpoints returned"))
    }

    /// Create a mux job and return its handle.
    pub async fn start_merge_job(&self, spec: &MergeJobSpec) -> ServiceResult<JobHandle> {
        debug!(video = %spec.video_uri, audio = %spec.audio_uri, "creating merge job");

        let response = self
            .client
            .create_job()
            .role(&self.role_arn)
            .settings(merge_job_settings(spec))
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        let job_id = response
            .job()
            .and_then(|job| job.id())
            .ok_or_else(|| ServiceError::invalid_response("create_job returned no job id"))?;

        info!(job_id = %job_id, "merge job submitted");
        Ok(JobHandle::new(job_id))
    }
}

impl StatusSource for MediaConvertClient {
    type Handle = JobHandle;

    async fn status(&self, handle: &JobHandle) -> Result<StatusSnapshot, StatusQueryError> {
        let response = self
            .client
            .get_job()
            .id(handle.as_str())
            .send()
            .await
            .map_err(|e| StatusQueryError::new(e.to_string()))?;

        let job = response
            .job()
            .ok_or_else(|| StatusQueryError::new("no job in status response"))?;

        let raw = job
            .status()
            .map(|status| status.as_str())
            .unwrap_or("missing");

        Ok(map_job_status(raw, job.error_message()))
    }
}

/// Map a raw MediaConvert job status into a classified snapshot.
/// Unrecognized values become `Error` so the monitor treats them as terminal.
fn map_job_status(raw: &str, error_message: Option<&str>) -> StatusSnapshot {
    match raw {
        "SUBMITTED" => StatusSnapshot::of(JobStatus::Pending),
        "PROGRESSING" => StatusSnapshot::of(JobStatus::InProgress),
        "COMPLETE" => StatusSnapshot::of(JobStatus::Completed),
        "CANCELED" => StatusSnapshot::of(JobStatus::Canceled),
        "ERROR" => {
            let snapshot = StatusSnapshot::of(JobStatus::Failed);
            match error_message {
                Some(message) => snapshot.with_message(message),
                None => snapshot.with_message("Unknown error"),
            }
        }
        other => {
            StatusSnapshot::of(JobStatus::Error).with_message(format!("unrecognized status: {other}"))
        }
    }
}

/// MP4/H.264/AAC settings for muxing one audio track onto one video input.
///
/// The video's own track is selector 1; the narration file comes in as
/// external selector 2 with loudness normalization, matching broadcast
/// levels so narration volume does not depend on the synthesis voice.
fn merge_job_settings(spec: &MergeJobSpec) -> JobSettings {
    let input = Input::builder()
        .file_input(&spec.video_uri)
        .timecode_source(InputTimecodeSource::Zerobased)
        .video_selector(VideoSelector::builder().build())
        .audio_selectors(
            "Audio Selector 1",
            AudioSelector::builder()
                .default_selection(AudioDefaultSelection::Default)
                .build(),
        )
        .audio_selectors(
            "Audio Selector 2",
            AudioSelector::builder()
                .default_selection(AudioDefaultSelection::Default)
                .external_audio_file_input(&spec.audio_uri)
                .build(),
        )
        .build();

    let audio = AudioDescription::builder()
        .audio_source_name("Audio Selector 2")
        .audio_normalization_settings(
            AudioNormalizationSettings::builder()
                .algorithm(AudioNormalizationAlgorithm::ItuBs17703)
                .algorithm_control(AudioNormalizationAlgorithmControl::CorrectAudio)
                .target_lkfs(AUDIO_TARGET_LKFS)
                .build(),
        )
        .codec_settings(
            AudioCodecSettings::builder()
                .codec(AudioCodec::Aac)
                .aac_settings(
                    AacSettings::builder()
                        .bitrate(AUDIO_BITRATE)
                        .coding_mode(AacCodingMode::CodingMode20)
                        .sample_rate(AUDIO_SAMPLE_RATE)
                        .build(),
                )
                .build(),
        )
        .build();

    let output = Output::builder()
        .container_settings(
            ContainerSettings::builder()
                .container(ContainerType::Mp4)
                .mp4_settings(Mp4Settings::builder().build())
                .build(),
        )
        .video_description(
            VideoDescription::builder()
                .codec_settings(
                    VideoCodecSettings::builder()
                        .codec(VideoCodec::H264)
                        .h264_settings(
                            H264Settings::builder()
                                .max_bitrate(VIDEO_MAX_BITRATE)
                                .rate_control_mode(H264RateControlMode::Qvbr)
                                .scene_change_detect(H264SceneChangeDetect::TransitionDetection)
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .audio_descriptions(audio)
        .build();

    let output_group = OutputGroup::builder()
        .name("File Group")
        .outputs(output)
        .output_group_settings(
            OutputGroupSettings::builder()
                .r#type(OutputGroupType::FileGroupSettings)
                .file_group_settings(
                    FileGroupSettings::builder()
                        .destination(&spec.destination_uri)
                        .build(),
                )
                .build(),
        )
        .build();

    JobSettings::builder()
        .timecode_config(
            TimecodeConfig::builder()
                .source(TimecodeSource::Zerobased)
                .build(),
        )
        .inputs(input)
        .output_groups(output_group)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_job_status("SUBMITTED", None).status, JobStatus::Pending);
        assert_eq!(
            map_job_status("PROGRESSING", None).status,
            JobStatus::InProgress
        );
        assert_eq!(map_job_status("COMPLETE", None).status, JobStatus::Completed);
        assert_eq!(map_job_status("CANCELED", None).status, JobStatus::Canceled);
    }

    #[test]
    fn test_error_status_defaults_message() {
        let snapshot = map_job_status("ERROR", None);
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.message.as_deref(), Some("Unknown error"));

        let detailed = map_job_status("ERROR", Some("1404: input not found"));
        assert_eq!(detailed.message.as_deref(), Some("1404: input not found"));
    }

    #[test]
    fn test_unknown_status_is_error() {
        let snapshot = map_job_status("NEW_STATE", None);
        assert_eq!(snapshot.status, JobStatus::Error);
    }

    #[test]
    fn test_merge_settings_wire_inputs_and_destination() {
        let spec = MergeJobSpec {
            video_uri: "s3://out/story/job/output.mp4".to_string(),
            audio_uri: "s3://out/story/audio/speech_1.mp3".to_string(),
            destination_uri: "s3://out/story/final/final_output".to_string(),
        };
        let settings = merge_job_settings(&spec);

        let input = &settings.inputs()[0];
        assert_eq!(input.file_input(), Some("s3://out/story/job/output.mp4"));
        let narration = &input.audio_selectors().unwrap()["Audio Selector 2"];
        assert_eq!(
            narration.external_audio_file_input(),
            Some("s3://out/story/audio/speech_1.mp3")
        );

        let group = &settings.output_groups()[0];
        let destination = group
            .output_group_settings()
            .and_then(|s| s.file_group_settings())
            .and_then(|s| s.destination());
        assert_eq!(destination, Some("s3://out/story/final/final_output"));
    }
}
