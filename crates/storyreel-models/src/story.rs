//! Story identifiers.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the sanitized topic segment in a story id.
const TOPIC_SEGMENT_MAX: usize = 30;

/// Characters dropped from a topic when forming a story id.
static TOPIC_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("valid pattern"));

/// Unique identifier for one story, of the form
/// `YYYYMMDD_<sanitized-topic>_<6-hex>`.
///
/// The sanitized topic keeps the id readable in bucket listings while the
/// uuid suffix keeps concurrent invocations for the same topic distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(String);

impl StoryId {
    /// Generate a fresh story id for a topic.
    pub fn generate(topic: &str) -> Self {
        let date = Utc::now().format("%Y%m%d");
        let unique: String = Uuid::new_v4().to_string().chars().take(6).collect();
        Self(format!("{}_{}_{}", date, sanitize_topic(topic), unique))
    }

    /// Wrap an existing identifier, e.g. one received in a request payload.
    pub fn from_existing(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sanitize a topic string for use in storage keys: lowercase, spaces to
/// underscores, anything outside `[a-z0-9_]` dropped, capped at 30 chars.
pub fn sanitize_topic(topic: &str) -> String {
    let lowered = topic.to_lowercase().replace(' ', "_");
    let mut sanitized = TOPIC_DISALLOWED.replace_all(&lowered, "").into_owned();
    sanitized.truncate(TOPIC_SEGMENT_MAX);
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_punctuation() {
        assert_eq!(sanitize_topic("A Dragon's Quest!"), "a_dragons_quest");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_topic(&long).len(), 30);
    }

    #[test]
    fn test_story_id_shape() {
        let id = StoryId::generate("Space Cats");
        let parts: Vec<&str> = id.as_str().splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8); // YYYYMMDD
        assert!(id.as_str().contains("space_cats"));
    }
}
