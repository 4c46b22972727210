use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::youtube::TranscriptBackend;
use crate::{Segment, TrackDescriptor};

/// In-memory backend that records every call it receives
#[derive(Default)]
pub struct FakeBackend {
    tracks: Option<Vec<TrackDescriptor>>,
    transcripts: HashMap<String, Vec<Segment>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    /// Listing fails with TranscriptsDisabled
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Lists `tracks`; only the languages in `transcripts` can be fetched
    pub fn with_tracks(tracks: &[(&str, bool)], transcripts: &[(&str, Vec<Segment>)]) -> Self {
        Self {
            tracks: Some(
                tracks
                    .iter()
                    .map(|(code, generated)| TrackDescriptor {
                        language: format!("Language {code}"),
                        language_code: code.to_string(),
                        is_generated: *generated,
                    })
                    .collect(),
            ),
            transcripts: transcripts
                .iter()
                .map(|(code, segments)| (code.to_string(), segments.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn segment(text: &str, start: f64) -> Segment {
    Segment {
        text: text.to_string(),
        start,
        duration: 1.0,
    }
}

#[async_trait]
impl TranscriptBackend for FakeBackend {
    async fn list(&self, video_id: &str) -> Result<Vec<TrackDescriptor>, BackendError> {
        self.calls.lock().unwrap().push(format!("list:{video_id}"));
        self.tracks.clone().ok_or_else(|| BackendError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        })
    }

    async fn fetch(&self, video_id: &str, language_code: &str) -> Result<Vec<Segment>, BackendError> {
        self.calls.lock().unwrap().push(format!("fetch:{language_code}"));
        self.transcripts
            .get(language_code)
            .cloned()
            .ok_or_else(|| BackendError::NoTranscriptFound {
                video_id: video_id.to_string(),
                language: language_code.to_string(),
                available: self.transcripts.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }
}
