//! Polly client for asynchronous narration synthesis.
//!
//! Long narration goes through speech-synthesis tasks, which write the
//! audio to a bucket and are polled for completion. The completed task
//! reports the output URI, which may carry a task-id suffix the caller
//! did not choose; the reported key is still verified through the
//! artifact locator before anything consumes it.

use aws_sdk_polly::types::{Engine, LanguageCode, OutputFormat, TextType, VoiceId};
use aws_sdk_polly::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use storyreel_jobs::{StatusQueryError, StatusSource};
use storyreel_models::{JobHandle, JobStatus, StatusSnapshot};

use crate::error::{ServiceError, ServiceResult};

/// A submitted speech-synthesis task.
#[derive(Debug, Clone)]
pub struct NarrationTask {
    /// Task id polled for status
    pub handle: JobHandle,
    /// Output URI reported at submission, when the service provides one
    pub output_uri: Option<String>,
}

/// Polly client.
pub struct PollyClient {
    client: Client,
    voice_id: VoiceId,
}

impl PollyClient {
    pub fn new(sdk_config: &SdkConfig, voice: &str) -> Self {
        Self {
            client: Client::new(sdk_config),
            voice_id: VoiceId::from(voice),
        }
    }

    /// Start an asynchronous synthesis task writing under `key_prefix`
    /// in `output_bucket`.
    pub async fn start_narration(
        &self,
        text: &str,
        output_bucket: &str,
        key_prefix: &str,
    ) -> ServiceResult<NarrationTask> {
        debug!(chars = text.len(), prefix = %key_prefix, "starting narration synthesis");

        let response = self
            .client
            .start_speech_synthesis_task()
            .engine(Engine::Neural)
            .language_code(LanguageCode::EnUs)
            .output_format(OutputFormat::Mp3)
            .output_s3_bucket_name(output_bucket)
            .output_s3_key_prefix(key_prefix)
            .text(text)
            .voice_id(self.voice_id.clone())
            .sample_rate("24000")
            .text_type(TextType::Text)
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        let task = response
            .synthesis_task()
            .ok_or_else(|| ServiceError::invalid_response("no synthesis task in response"))?;
        let task_id = task
            .task_id()
            .ok_or_else(|| ServiceError::invalid_response("synthesis task has no id"))?;

        info!(task_id = %task_id, "narration task submitted");
        Ok(NarrationTask {
            handle: JobHandle::new(task_id),
            output_uri: task.output_uri().map(str::to_string),
        })
    }
}

impl StatusSource for PollyClient {
    type Handle = JobHandle;

    async fn status(&self, handle: &JobHandle) -> Result<StatusSnapshot, StatusQueryError> {
        let response = self
            .client
            .get_speech_synthesis_task()
            .task_id(handle.as_str())
            .send()
            .await
            .map_err(|e| StatusQueryError::new(e.to_string()))?;

        let task = response
            .synthesis_task()
            .ok_or_else(|| StatusQueryError::new("no synthesis task in status response"))?;

        let raw = task
            .task_status()
            .map(|status| status.as_str())
            .unwrap_or("missing");

        Ok(map_task_status(
            raw,
            task.output_uri(),
            task.task_status_reason(),
        ))
    }
}

/// Map a raw synthesis-task status into a classified snapshot.
/// Unrecognized values become `Error` so the monitor treats them as terminal.
fn map_task_status(raw: &str, output_uri: Option<&str>, reason: Option<&str>) -> StatusSnapshot {
    match raw {
        "scheduled" => StatusSnapshot::of(JobStatus::Pending),
        "inProgress" => StatusSnapshot::of(JobStatus::InProgress),
        "completed" => {
            let snapshot = StatusSnapshot::of(JobStatus::Completed);
            match output_uri {
                Some(uri) => snapshot.with_output(uri),
                None => snapshot,
            }
        }
        "failed" => {
            let snapshot = StatusSnapshot::of(JobStatus::Failed);
            match reason {
                Some(reason) => snapshot.with_message(reason),
                None => snapshot,
            }
        }
        other => {
            StatusSnapshot::of(JobStatus::Error).with_message(format!("unrecognized status: {other}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_maps_to_pending() {
        let snapshot = map_task_status("scheduled", None, None);
        assert_eq!(snapshot.status, JobStatus::Pending);
    }

    #[test]
    fn test_completed_carries_output_uri() {
        let snapshot = map_task_status(
            "completed",
            Some("https://s3.us-east-1.amazonaws.com/out/story/audio/speech_1700000000.abc.mp3"),
            None,
        );
        assert_eq!(snapshot.status, JobStatus::Completed);
        assert!(snapshot.output_ref.unwrap().ends_with(".mp3"));
    }

    #[test]
    fn test_failed_carries_reason() {
        let snapshot = map_task_status("failed", None, Some("text too long"));
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.message.as_deref(), Some("text too long"));
    }

    #[test]
    fn test_unknown_status_is_error() {
        let snapshot = map_task_status("paused", None, None);
        assert_eq!(snapshot.status, JobStatus::Error);
    }
}
