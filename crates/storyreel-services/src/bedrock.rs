//! Bedrock runtime client for story text, scene images, and video synthesis.
//!
//! Text and image generation are synchronous `converse`/`invoke_model`
//! calls. Video synthesis goes through the async-invoke API: submission
//! returns an invocation ARN that the job monitor polls via the
//! [`StatusSource`] implementation below.

use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::{
    AsyncInvokeOutputDataConfig, AsyncInvokeS3OutputDataConfig, ContentBlock, ConversationRole,
    InferenceConfiguration, Message,
};
use aws_sdk_bedrockruntime::Client;
use aws_smithy_types::{Document, Number as SmithyNumber};
use aws_types::SdkConfig;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, info};

use storyreel_jobs::{StatusQueryError, StatusSource};
use storyreel_models::{JobHandle, JobStatus, StatusSnapshot};

use crate::error::{ServiceError, ServiceResult};

/// Render dimensions shared by image and video generation.
const IMAGE_WIDTH: u32 = 1280;
const IMAGE_HEIGHT: u32 = 720;
const VIDEO_FPS: u32 = 24;
const VIDEO_SEED: u32 = 42;

/// Model identifiers for the three Bedrock-backed stages.
#[derive(Debug, Clone)]
pub struct BedrockModels {
    pub text_model_id: String,
    pub image_model_id: String,
    pub video_model_id: String,
}

impl Default for BedrockModels {
    fn default() -> Self {
        Self {
            text_model_id: "amazon.nova-lite-v1:0".to_string(),
            image_model_id: "amazon.nova-canvas-v1:0".to_string(),
            video_model_id: "amazon.nova-reel-v1:1".to_string(),
        }
    }
}

/// One shot of a multi-shot video request: narration text plus the
/// storage URI of the rendered scene image.
#[derive(Debug, Clone)]
pub struct VideoShot {
    pub text: String,
    pub image_uri: String,
}

/// A submitted asynchronous video-synthesis job.
#[derive(Debug, Clone)]
pub struct VideoJob {
    /// Invocation ARN polled for status
    pub handle: JobHandle,
    /// Short job id; the service nests output under this prefix
    pub job_id: String,
}

/// Bedrock runtime client.
pub struct BedrockClient {
    client: Client,
    models: BedrockModels,
}

impl BedrockClient {
    pub fn new(sdk_config: &SdkConfig, models: BedrockModels) -> Self {
        Self {
            client: Client::new(sdk_config),
            models,
        }
    }

    /// Generate story text with scene descriptions for a topic.
    pub async fn generate_story(&self, topic: &str) -> ServiceResult<String> {
        let prompt = format!("Create 5 visual scene descriptions for a story about: {topic}");
        debug!(model = %self.models.text_model_id, "requesting story text");

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt))
            .build()
            .map_err(|e| ServiceError::invalid_response(e.to_string()))?;

        let response = self
            .client
            .converse()
            .model_id(&self.models.text_model_id)
            .messages(message)
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(1000)
                    .temperature(0.7)
                    .top_p(0.9)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        let text = response
            .output()
            .and_then(|output| output.as_message().ok())
            .and_then(|message| message.content().first())
            .and_then(|block| block.as_text().ok())
            .ok_or_else(|| ServiceError::invalid_response("converse returned no text content"))?;

        info!(chars = text.len(), "story text generated");
        Ok(text.clone())
    }

    /// Generate one scene image, returning the decoded PNG bytes.
    ///
    /// An optional style name is prepended to the prompt; style content
    /// beyond that is the caller's concern.
    pub async fn generate_image(&self, scene_text: &str, style: Option<&str>) -> ServiceResult<Vec<u8>> {
        let prompt = match style {
            Some(style) => format!("{style} style: {scene_text}"),
            None => scene_text.to_string(),
        };

        let body = json!({
            "taskType": "TEXT_IMAGE",
            "textToImageParams": {
                "text": prompt
            },
            "imageGenerationConfig": {
                "numberOfImages": 1,
                "width": IMAGE_WIDTH,
                "height": IMAGE_HEIGHT,
                "cfgScale": 8.0,
                "seed": 0
            }
        });

        debug!(model = %self.models.image_model_id, "requesting scene image");
        let response = self
            .client
            .invoke_model()
            .model_id(&self.models.image_model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(serde_json::to_vec(&body)?))
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        let payload: Value = serde_json::from_slice(response.body.as_ref())?;
        let image_b64 = payload
            .get("images")
            .and_then(|images| images.get(0))
            .and_then(|image| image.as_str())
            .ok_or_else(|| ServiceError::invalid_response("image response had no images array"))?;

        BASE64
            .decode(image_b64)
            .map_err(|e| ServiceError::invalid_response(format!("image payload not base64: {e}")))
    }

    /// Submit an asynchronous multi-shot video job.
    ///
    /// `output_uri` is the `s3://` prefix the service writes under; the
    /// actual object lands below a job-id subfolder of it.
    pub async fn start_video_job(
        &self,
        shots: &[VideoShot],
        output_uri: &str,
    ) -> ServiceResult<VideoJob> {
        let model_input = video_model_input(shots);

        let output_config = AsyncInvokeS3OutputDataConfig::builder()
            .s3_uri(output_uri)
            .build()
            .map_err(|e| ServiceError::invalid_response(e.to_string()))?;

        let response = self
            .client
            .start_async_invoke()
            .model_id(&self.models.video_model_id)
            .model_input(json_to_document(model_input))
            .output_data_config(AsyncInvokeOutputDataConfig::S3OutputDataConfig(output_config))
            .send()
            .await
            .map_err(|e| ServiceError::api(e.to_string()))?;

        let invocation_arn = response.invocation_arn().to_string();
        let job_id = job_id_from_arn(&invocation_arn);
        info!(job_id = %job_id, "video synthesis job submitted");

        Ok(VideoJob {
            handle: JobHandle::new(invocation_arn),
            job_id,
        })
    }
}

impl StatusSource for BedrockClient {
    type Handle = JobHandle;

    async fn status(&self, handle: &JobHandle) -> Result<StatusSnapshot, StatusQueryError> {
        let response = self
            .client
            .get_async_invoke()
            .invocation_arn(handle.as_str())
            .send()
            .await
            .map_err(|e| StatusQueryError::new(e.to_string()))?;

        Ok(map_async_invoke_status(
            response.status().as_str(),
            response.failure_message(),
        ))
    }
}

/// Map a raw async-invoke status string into a classified snapshot.
/// Unrecognized values become `Error` so the monitor treats them as terminal.
fn map_async_invoke_status(raw: &str, failure_message: Option<&str>) -> StatusSnapshot {
    match raw {
        "InProgress" => StatusSnapshot::of(JobStatus::InProgress),
        "Completed" => StatusSnapshot::of(JobStatus::Completed),
        "Failed" => {
            let snapshot = StatusSnapshot::of(JobStatus::Failed);
            match failure_message {
                Some(message) => snapshot.with_message(message),
                None => snapshot,
            }
        }
        other => {
            StatusSnapshot::of(JobStatus::Error).with_message(format!("unrecognized status: {other}"))
        }
    }
}

/// Short job id from an invocation ARN: the segment after the final `/`.
fn job_id_from_arn(invocation_arn: &str) -> String {
    invocation_arn
        .rsplit('/')
        .next()
        .unwrap_or(invocation_arn)
        .to_string()
}

/// Request body for a multi-shot video job.
fn video_model_input(shots: &[VideoShot]) -> Value {
    let shots: Vec<Value> = shots
        .iter()
        .map(|shot| {
            json!({
                "text": shot.text.trim(),
                "image": {
                    "format": "png",
                    "source": {
                        "s3Location": {
                            "uri": shot.image_uri
                        }
                    }
                }
            })
        })
        .collect();

    json!({
        "taskType": "MULTI_SHOT_MANUAL",
        "multiShotManualParams": {
            "shots": shots
        },
        "videoGenerationConfig": {
            "fps": VIDEO_FPS,
            "dimension": format!("{IMAGE_WIDTH}x{IMAGE_HEIGHT}"),
            "seed": VIDEO_SEED
        }
    })
}

/// Convert a JSON value into the smithy `Document` the async-invoke API takes.
fn json_to_document(value: Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(SmithyNumber::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(SmithyNumber::NegInt(i))
            } else {
                Document::Number(SmithyNumber::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Value::String(s) => Document::String(s),
        Value::Array(items) => Document::Array(items.into_iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.into_iter()
                .map(|(key, value)| (key, json_to_document(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            map_async_invoke_status("InProgress", None).status,
            JobStatus::InProgress
        );
        assert_eq!(
            map_async_invoke_status("Completed", None).status,
            JobStatus::Completed
        );

        let failed = map_async_invoke_status("Failed", Some("bad shot reference"));
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("bad shot reference"));
    }

    #[test]
    fn test_unknown_status_is_error() {
        let snapshot = map_async_invoke_status("Migrating", None);
        assert_eq!(snapshot.status, JobStatus::Error);
        assert!(snapshot.message.unwrap().contains("Migrating"));
    }

    #[test]
    fn test_job_id_from_arn() {
        assert_eq!(
            job_id_from_arn("arn:aws:bedrock:us-east-1:123:async-invoke/abc123"),
            "abc123"
        );
        assert_eq!(job_id_from_arn("no-slashes"), "no-slashes");
    }

    #[test]
    fn test_video_model_input_shape() {
        let shots = vec![
            VideoShot {
                text: " A fox runs. ".to_string(),
                image_uri: "s3://in/story/scene_1.png".to_string(),
            },
            VideoShot {
                text: "It rains.".to_string(),
                image_uri: "s3://in/story/scene_2.png".to_string(),
            },
        ];
        let input = video_model_input(&shots);

        assert_eq!(input["taskType"], "MULTI_SHOT_MANUAL");
        let rendered = &input["multiShotManualParams"]["shots"];
        assert_eq!(rendered.as_array().unwrap().len(), 2);
        assert_eq!(rendered[0]["text"], "A fox runs.");
        assert_eq!(
            rendered[1]["image"]["source"]["s3Location"]["uri"],
            "s3://in/story/scene_2.png"
        );
        assert_eq!(input["videoGenerationConfig"]["dimension"], "1280x720");
    }

    #[test]
    fn test_json_to_document_numbers() {
        let doc = json_to_document(json!({"fps": 24, "cfg": 8.0, "neg": -1}));
        match doc {
            Document::Object(map) => {
                assert!(matches!(
                    map["fps"],
                    Document::Number(SmithyNumber::PosInt(24))
                ));
                assert!(matches!(map["cfg"], Document::Number(SmithyNumber::Float(_))));
                assert!(matches!(
                    map["neg"],
                    Document::Number(SmithyNumber::NegInt(-1))
                ));
            }
            _ => panic!("expected object"),
        }
    }
}
