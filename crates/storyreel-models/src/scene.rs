//! Scene sets and story metadata.
//!
//! A story is rendered as a fixed number of shots. `scenes.json` stores
//! them as a flat object with `shot{N}_text` keys because that is the
//! shape the video-synthesis request builder consumes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::story::StoryId;

/// Number of scenes every story is rendered with.
pub const SCENE_COUNT: usize = 5;

/// Target render resolution.
pub const TARGET_WIDTH: u32 = 1280;
pub const TARGET_HEIGHT: u32 = 720;

/// Exactly [`SCENE_COUNT`] scene descriptions for one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSet {
    scenes: Vec<String>,
}

impl SceneSet {
    /// Build a scene set from model output lines, padding with placeholders
    /// when the model produced fewer usable lines than [`SCENE_COUNT`].
    pub fn from_story_text(story_text: &str, topic: &str) -> Self {
        let mut scenes: Vec<String> = story_text
            .lines()
            .filter_map(clean_scene_text)
            .take(SCENE_COUNT)
            .collect();

        while scenes.len() < SCENE_COUNT {
            scenes.push(format!("Scene {} about {}", scenes.len() + 1, topic));
        }

        Self { scenes }
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Scene number (1-based) and text pairs, in shot order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.scenes
            .iter()
            .enumerate()
            .map(|(i, s)| (i + 1, s.as_str()))
    }

    /// Storage key for the rendered image of a scene.
    pub fn image_key(story_id: &StoryId, scene_number: usize) -> String {
        format!("{story_id}/scene_{scene_number}.png")
    }

    /// Serialize into the `shot{N}_text` object stored as `scenes.json`.
    pub fn to_shots_json(&self) -> serde_json::Value {
        let map: BTreeMap<String, &str> = self
            .numbered()
            .map(|(n, text)| (format!("shot{n}_text"), text))
            .collect();
        serde_json::to_value(map).expect("string map serializes")
    }
}

/// Clean one line of model output into a usable scene description.
///
/// Returns `None` for blank lines, markdown headers, and `Scene N` title
/// lines, which the text model tends to interleave with the descriptions.
pub fn clean_scene_text(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("###") || line.starts_with("Scene") {
        return None;
    }
    Some(line.to_string())
}

/// Metadata stored alongside the generated assets as `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryMetadata {
    pub story_id: StoryId,
    pub story_topic: String,
    pub creation_date: DateTime<Utc>,
    pub scene_count: usize,
    pub scenes: Vec<String>,
    pub full_text: String,
    pub image_format: String,
    pub image_resolution: ImageResolution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResolution {
    pub width: u32,
    pub height: u32,
}

impl StoryMetadata {
    pub fn new(story_id: StoryId, topic: impl Into<String>, scenes: &SceneSet, full_text: impl Into<String>) -> Self {
        Self {
            story_id,
            story_topic: topic.into(),
            creation_date: Utc::now(),
            scene_count: scenes.scenes().len(),
            scenes: scenes.scenes().to_vec(),
            full_text: full_text.into(),
            image_format: "png".to_string(),
            image_resolution: ImageResolution {
                width: TARGET_WIDTH,
                height: TARGET_HEIGHT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_scene_text_filters_titles() {
        assert_eq!(clean_scene_text(""), None);
        assert_eq!(clean_scene_text("### Act One"), None);
        assert_eq!(clean_scene_text("Scene 2: The Forest"), None);
        assert_eq!(
            clean_scene_text("  A fox crosses a moonlit river.  "),
            Some("A fox crosses a moonlit river.".to_string())
        );
    }

    #[test]
    fn test_scene_set_pads_to_five() {
        let set = SceneSet::from_story_text("Only one line here.", "foxes");
        assert_eq!(set.scenes().len(), SCENE_COUNT);
        assert_eq!(set.scenes()[0], "Only one line here.");
        assert_eq!(set.scenes()[4], "Scene 5 about foxes");
    }

    #[test]
    fn test_scene_set_truncates_to_five() {
        let text = (1..=8)
            .map(|i| format!("Description number {i}."))
            .collect::<Vec<_>>()
            .join("\n");
        let set = SceneSet::from_story_text(&text, "x");
        assert_eq!(set.scenes().len(), SCENE_COUNT);
    }

    #[test]
    fn test_shots_json_shape() {
        let set = SceneSet::from_story_text(
            "A knight rides out.\nA storm gathers.\nA castle burns.\nA truce is struck.\nDawn breaks.",
            "knights",
        );
        let json = set.to_shots_json();
        assert_eq!(json.as_object().unwrap().len(), SCENE_COUNT);
        assert_eq!(json["shot1_text"], "A knight rides out.");
        assert_eq!(json["shot5_text"], "Dawn breaks.");
    }

    #[test]
    fn test_image_key_layout() {
        let id = StoryId::from_existing("20250101_foxes_abc123");
        assert_eq!(
            SceneSet::image_key(&id, 3),
            "20250101_foxes_abc123/scene_3.png"
        );
    }
}
