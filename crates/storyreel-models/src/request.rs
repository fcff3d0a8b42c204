//! Invocation request payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Request payload for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineRequest {
    /// Topic to build the story around
    #[validate(length(min = 1, max = 500, message = "topic is required"))]
    pub topic: String,
    /// Optional visual style name passed through to image prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl PipelineRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            style: None,
        }
    }

    /// Validate required fields, collapsing field errors into one message.
    pub fn check(&self) -> Result<(), RequestError> {
        self.validate().map_err(|errors| {
            let detail = errors
                .field_errors()
                .iter()
                .map(|(field, errs)| {
                    let msg = errs
                        .first()
                        .and_then(|e| e.message.as_deref())
                        .unwrap_or("invalid value");
                    format!("{field}: {msg}")
                })
                .collect::<Vec<_>>()
                .join("; ");
            RequestError::Invalid(detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_topic_rejected() {
        let request = PipelineRequest::new("");
        let err = request.check().unwrap_err();
        assert!(err.to_string().contains("topic"));
    }

    #[test]
    fn test_valid_request_passes() {
        let request = PipelineRequest::new("a lighthouse keeper");
        assert!(request.check().is_ok());
    }

    #[test]
    fn test_style_is_optional_in_json() {
        let request: PipelineRequest = serde_json::from_str(r#"{"topic": "owls"}"#).unwrap();
        assert!(request.style.is_none());
    }
}
