//! Structured invocation responses.
//!
//! Every invocation resolves to an HTTP-style status code plus a body
//! naming the outcome, the sub-jobs that were started, and the storage
//! locations that were resolved, whether or not the pipeline succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sub-job started during the invocation, for diagnosis and billing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubJob {
    /// Pipeline stage that started the job
    pub stage: String,
    /// Service-assigned job identifier
    pub job_id: String,
}

/// Response body for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Human-readable outcome summary
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    /// Terminal classification of the invocation ("completed", "timeout", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Sub-jobs started before the invocation resolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<SubJob>,
    /// Resolved artifact locations, keyed by stage output name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,
    /// Error detail when the invocation did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Storage keys that were checked and not found, when relevant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_paths: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResponseBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            story_id: None,
            status: None,
            jobs: Vec::new(),
            artifacts: Vec::new(),
            error: None,
            attempted_paths: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured result of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl InvocationResponse {
    pub fn ok(body: ResponseBody) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        let mut body = ResponseBody::new(message.clone());
        body.error = Some(message);
        Self {
            status_code: 400,
            body,
        }
    }

    pub fn server_error(body: ResponseBody) -> Self {
        Self {
            status_code: 500,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code < 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collections_are_omitted() {
        let response = InvocationResponse::ok(ResponseBody::new("done"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status_code"], 200);
        assert!(json["body"].get("jobs").is_none());
        assert!(json["body"].get("error").is_none());
    }

    #[test]
    fn test_bad_request_carries_error() {
        let response = InvocationResponse::bad_request("topic is required");
        assert_eq!(response.status_code, 400);
        assert!(!response.is_success());
        assert_eq!(response.body.error.as_deref(), Some("topic is required"));
    }
}
