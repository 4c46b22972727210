use log::{debug, info, warn};
use serde::Serialize;

use crate::output::render_transcript;
use crate::youtube::TranscriptBackend;
use crate::{TrackDescriptor, extract_video_id};

/// Transcript found: which language won, what else exists, and the text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptPayload {
    pub video_id: String,
    pub language: String,
    pub available_transcripts: Vec<TrackDescriptor>,
    pub transcript: String,
}

/// Why no transcript came back. Fields past `error` depend on how far
/// resolution got: a failed listing carries only `error` and `video_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailurePayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried_languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_transcripts: Option<Vec<TrackDescriptor>>,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Success(TranscriptPayload),
    Failure(FailurePayload),
}

impl ToolResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolResult::Failure(_))
    }

    /// Pretty JSON, two-space indent, non-ASCII left as is
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Split a comma-separated preference list, dropping blank entries
pub fn parse_languages(languages: &str) -> Vec<String> {
    languages
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve and render the transcript for `video`.
///
/// Preferred languages are tried in order, one attempt each. When none of
/// them can be fetched the first listed track is used instead. Backend
/// failures never escape; they end up in the returned [`ToolResult`].
pub async fn get_transcript(
    backend: &dyn TranscriptBackend,
    video: &str,
    languages: &str,
    timestamps: bool,
) -> ToolResult {
    let video_id = extract_video_id(video);
    let lang_list = parse_languages(languages);
    info!("Transcript requested: video={video_id} languages={lang_list:?}");

    let tracks = match backend.list(&video_id).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!("Listing transcripts for {video_id} failed: {e}");
            return ToolResult::Failure(FailurePayload {
                error: format!("Could not list transcripts: {e}"),
                tried_languages: None,
                errors: None,
                available_transcripts: None,
                video_id,
            });
        }
    };

    let mut errors = Vec::new();
    let mut fetched = None;

    for lang in &lang_list {
        match backend.fetch(&video_id, lang).await {
            Ok(segments) => {
                fetched = Some((lang.clone(), segments));
                break;
            }
            Err(e) => {
                debug!("Language {lang} failed for {video_id}: {e}");
                errors.push(format!("{lang}: {e}"));
            }
        }
    }

    let (language, segments) = match fetched {
        Some(found) => found,
        None => {
            let fallback = match tracks.first() {
                Some(track) => {
                    debug!("Falling back to first track: {}", track.language_code);
                    backend
                        .fetch(&video_id, &track.language_code)
                        .await
                        .map(|segments| (track.language_code.clone(), segments))
                        .map_err(|e| e.to_string())
                }
                None => Err(format!("no transcripts available for video {video_id}")),
            };

            match fallback {
                Ok(found) => found,
                Err(e) => {
                    warn!("No transcript could be fetched for {video_id}: {e}");
                    return ToolResult::Failure(FailurePayload {
                        error: format!("Could not fetch transcript: {e}"),
                        tried_languages: Some(lang_list),
                        errors: Some(errors),
                        available_transcripts: Some(tracks),
                        video_id,
                    });
                }
            }
        }
    };

    info!(
        "Transcript resolved: video={video_id} language={language} cues={}",
        segments.len()
    );

    ToolResult::Success(TranscriptPayload {
        transcript: render_transcript(&segments, timestamps),
        video_id,
        language,
        available_transcripts: tracks,
    })
}
