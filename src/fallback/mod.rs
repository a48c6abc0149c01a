//! Deterministic stand-ins for unavailable backends.
//!
//! Everything here is a pure function of its input: no I/O, no randomness.

mod deduction;

pub use deduction::{mock_deduction, strip_code_fences};

use sha2::{Digest, Sha256};

/// Sample clip served for every mock video.
pub const MOCK_VIDEO_URL: &str = "https://www.w3school.com.cn/i/movie.mp4";

/// Battle keywords with a dedicated mock clip.
const BATTLE_VIDEOS: &[(&str, &str)] = &[
    ("锦州", MOCK_VIDEO_URL),
    ("平津", MOCK_VIDEO_URL),
    ("淮海", MOCK_VIDEO_URL),
    ("辽沈", MOCK_VIDEO_URL),
    ("长征", MOCK_VIDEO_URL),
    ("北伐", MOCK_VIDEO_URL),
    ("抗战", MOCK_VIDEO_URL),
    ("解放", MOCK_VIDEO_URL),
];

const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x400/1a2a6c/white";

fn battle_entry(text: &str) -> Option<&'static (&'static str, &'static str)> {
    BATTLE_VIDEOS.iter().find(|(keyword, _)| text.contains(keyword))
}

/// SHA256 of the trimmed text, first 8 bytes as hex.
fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Mock video URL for `text`.
///
/// The clip comes from the keyword table (first match, else the generic
/// clip); the `v` query parameter is a hash of the text, so the same text
/// always maps to the same URL.
pub fn mock_video_url(text: &str) -> String {
    let base = battle_entry(text)
        .map(|(_, url)| *url)
        .unwrap_or(MOCK_VIDEO_URL);
    format!("{}?v={}", base, text_digest(text))
}

/// Placeholder image with the prompt rendered as its caption.
pub fn placeholder_image_url(prompt: &str) -> String {
    let caption = prompt.trim().replace(':', "");
    match reqwest::Url::parse_with_params(PLACEHOLDER_IMAGE_BASE, &[("text", caption.as_str())]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::warn!("Could not build placeholder URL: {}", e);
            PLACEHOLDER_IMAGE_BASE.to_string()
        }
    }
}
