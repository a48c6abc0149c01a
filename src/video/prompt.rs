//! Cinematic prompt wrapper for video generation.

use serde::{Deserialize, Serialize};

/// Longest scene description, in characters, sent inside the wrapper.
pub const MAX_SCENE_CHARS: usize = 300;

const PROMPT_PREFIX: &str = "史诗般的战争场景，";
const PROMPT_SUFFIX: &str = "，电影质感，高清晰度，写实风格";

/// One step of a battle scenario supplied alongside the video text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<serde_json::Value>,
}

/// Build the prompt sent to the video backend.
///
/// Step descriptions are appended to the text, then the scene is cut to
/// [`MAX_SCENE_CHARS`] characters before wrapping.
pub fn build_cinematic_prompt(text: &str, steps: &[ScenarioStep]) -> String {
    let mut scene = text.trim().to_string();
    for step in steps {
        let description = step.description.trim();
        if description.is_empty() {
            continue;
        }
        if !scene.is_empty() {
            scene.push('，');
        }
        scene.push_str(description);
    }

    let scene: String = scene.chars().take(MAX_SCENE_CHARS).collect();
    format!("{}{}{}", PROMPT_PREFIX, scene, PROMPT_SUFFIX)
}
