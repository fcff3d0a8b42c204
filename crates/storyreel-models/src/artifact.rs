//! Artifact references and candidate storage keys.
//!
//! Asynchronous producers do not always write their output at the exact
//! key that was requested: some append an extension, some nest the object
//! under a job-id prefix, and most exhibit a visibility lag after the job
//! reports completion. An [`ArtifactRef`] names the location we expect,
//! and [`candidate_keys`] derives the ordered set of keys worth checking.

use serde::{Deserialize, Serialize};

/// A storage location expected to hold a produced object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key within the bucket
    pub key: String,
}

impl ArtifactRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Render as an `s3://bucket/key` URI.
    pub fn s3_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    /// Parse an `s3://bucket/key` URI.
    pub fn parse_s3_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("s3://")?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }

}

/// Derive the ordered candidate keys to check for an expected output key.
///
/// Covers the two layouts observed from transcoding services: the exact
/// requested key, the key with an extra `.mp4` appended, and the key with
/// a trailing `.mp4` toggled. Duplicates are removed while preserving
/// order, so the exact key is always tried first.
pub fn candidate_keys(key: &str) -> Vec<String> {
    let toggled = match key.strip_suffix(".mp4") {
        Some(stripped) => stripped.to_string(),
        None => format!("{key}.mp4"),
    };

    let mut candidates = Vec::with_capacity(3);
    for candidate in [key.to_string(), format!("{key}.mp4"), toggled] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_uri_round_trip() {
        let artifact = ArtifactRef::new("stories-out", "abc/final/final_output.mp4");
        assert_eq!(artifact.s3_uri(), "s3://stories-out/abc/final/final_output.mp4");

        let parsed = ArtifactRef::parse_s3_uri(&artifact.s3_uri()).unwrap();
        assert_eq!(parsed, artifact);
    }

    #[test]
    fn test_parse_rejects_malformed_uris() {
        assert!(ArtifactRef::parse_s3_uri("http://bucket/key").is_none());
        assert!(ArtifactRef::parse_s3_uri("s3://bucket-only").is_none());
        assert!(ArtifactRef::parse_s3_uri("s3:///key").is_none());
    }

    #[test]
    fn test_candidates_without_extension() {
        assert_eq!(
            candidate_keys("story/video/output"),
            vec!["story/video/output", "story/video/output.mp4"]
        );
    }

    #[test]
    fn test_candidates_with_extension() {
        assert_eq!(
            candidate_keys("story/video/output.mp4"),
            vec![
                "story/video/output.mp4",
                "story/video/output.mp4.mp4",
                "story/video/output",
            ]
        );
    }
}
