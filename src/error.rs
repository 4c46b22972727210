use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("invalid video id {video_id:?}: pass the 11-character id, not a URL")]
    InvalidVideoId { video_id: String },

    #[error("video {video_id} is unavailable")]
    VideoUnavailable { video_id: String },

    #[error("video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("video {video_id} is age restricted and needs a signed-in session")]
    AgeRestricted { video_id: String },

    #[error("YouTube is blocking requests from this IP")]
    RequestBlocked,

    #[error("subtitles are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("no transcript in language {language:?} for video {video_id} (available: {available})")]
    NoTranscriptFound {
        video_id: String,
        language: String,
        available: String,
    },

    #[error("captions for video {video_id} require a PO token")]
    PoTokenRequired { video_id: String },

    #[error("unexpected response from YouTube: {0}")]
    Parse(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}
