pub mod config;
pub mod error;
pub mod mcp;
pub mod output;
pub mod resolver;
pub mod youtube;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// One subtitle track the video offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Display name, e.g. "English (auto-generated)"
    pub language: String,
    pub language_code: String,
    /// True for machine (ASR) captions
    pub is_generated: bool,
}

static VIDEO_URL_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
    ]
    .map(|p| Regex::new(p).expect("video URL pattern compiles"))
});

/// Extract the video ID from a bare ID or one of the common YouTube URL shapes.
///
/// Input that matches nothing is returned trimmed but otherwise untouched; the
/// backend reports it as an invalid or unavailable video.
pub fn extract_video_id(input: &str) -> String {
    let input = input.trim();

    // Bare 11-character video ID
    if input.chars().count() == 11 && !input.contains('/') && !input.contains('.') {
        return input.to_string();
    }

    VIDEO_URL_PATTERNS
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_bare_id_is_not_validated() {
        // 11 chars without '/' or '.' pass through even with odd characters
        assert_eq!(extract_video_id("abc def!ghi"), "abc def!ghi");
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_unrecognized_input_passes_through() {
        assert_eq!(extract_video_id("not-a-valid-id"), "not-a-valid-id");
        assert_eq!(
            extract_video_id("https://vimeo.com/123456"),
            "https://vimeo.com/123456"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), "");
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), "dQw4w9WgXcQ");
        assert_eq!(extract_video_id("  some input \n"), "some input");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "https://youtu.be/dQw4w9WgXcQ?t=3",
            "  garbage.example/path ",
            "dQw4w9WgXcQ",
            "",
        ] {
            let once = extract_video_id(input);
            assert_eq!(extract_video_id(&once), once);
        }
    }
}
