use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::BackendError;
use crate::{Segment, TrackDescriptor};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const CONSENT_FORM_ACTION: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

const REASON_BOT_CHECK: &str = "Sign in to confirm";
const REASON_AGE_GATE: &str = "This video may be inappropriate for some users.";
const REASON_UNAVAILABLE: &str = "This video is unavailable";

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern compiles"));

/// Where transcripts come from. One list call, then any number of fetches.
#[async_trait]
pub trait TranscriptBackend: Send + Sync {
    /// All subtitle tracks of the video, manual tracks first
    async fn list(&self, video_id: &str) -> Result<Vec<TrackDescriptor>, BackendError>;

    /// Cues of the track in `language_code`, preferring a manual track over ASR
    async fn fetch(&self, video_id: &str, language_code: &str) -> Result<Vec<Segment>, BackendError>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TextRun {
    text: String,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn display_name(&self) -> String {
        match &self.name {
            Some(TrackName {
                simple_text: Some(text), ..
            }) => text.clone(),
            Some(TrackName { runs: Some(runs), .. }) => runs.iter().map(|r| r.text.as_str()).collect(),
            _ => self.language_code.clone(),
        }
    }

    fn descriptor(&self) -> TrackDescriptor {
        TrackDescriptor {
            language: self.display_name(),
            language_code: self.language_code.clone(),
            is_generated: self.is_generated(),
        }
    }
}

/// Transcript backend speaking YouTube's InnerTube player API and timedtext XML
pub struct YoutubeBackend {
    client: reqwest::Client,
}

impl YoutubeBackend {
    /// Build a backend whose every request gives up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn watch_page(&self, video_id: &str, cookie: Option<&str>) -> Result<String, BackendError> {
        let watch_url = format!("{WATCH_URL}{video_id}");
        debug!("Fetching watch page: {watch_url}");

        let mut request = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US");
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        Ok(request.send().await?.error_for_status()?.text().await?)
    }

    /// Watch page HTML, getting past the EU consent interstitial if it shows up
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, BackendError> {
        let html = self.watch_page(video_id, None).await?;
        if !html.contains(CONSENT_FORM_ACTION) {
            return Ok(html);
        }

        debug!("Consent page served, retrying with consent cookie");
        let value = extract_consent_value(&html)
            .ok_or_else(|| BackendError::Parse("consent page without a consent value".to_string()))?;
        let html = self
            .watch_page(video_id, Some(&format!("CONSENT=YES+{value}")))
            .await?;
        if html.contains(CONSENT_FORM_ACTION) {
            return Err(BackendError::Parse("consent cookie was not accepted".to_string()));
        }
        Ok(html)
    }

    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, BackendError> {
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = extract_api_key(&html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        let player_url = format!("{PLAYER_URL}?key={api_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        caption_tracks_from_player(resp, video_id)
    }
}

#[async_trait]
impl TranscriptBackend for YoutubeBackend {
    async fn list(&self, video_id: &str) -> Result<Vec<TrackDescriptor>, BackendError> {
        let tracks = self.caption_tracks(video_id).await?;
        debug!("Video {video_id} has {} caption track(s)", tracks.len());
        Ok(tracks.iter().map(CaptionTrack::descriptor).collect())
    }

    async fn fetch(&self, video_id: &str, language_code: &str) -> Result<Vec<Segment>, BackendError> {
        let tracks = self.caption_tracks(video_id).await?;
        let track = select_track(&tracks, video_id, language_code)?;
        debug!(
            "Using caption track: lang={} generated={}",
            track.language_code,
            track.is_generated()
        );

        if track.base_url.contains("&exp=xpe") {
            return Err(BackendError::PoTokenRequired {
                video_id: video_id.to_string(),
            });
        }

        let caption_url = track.base_url.replace("&fmt=srv3", "");
        let caption_xml = self
            .client
            .get(&caption_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }
}

fn extract_api_key(html: &str) -> Result<String, BackendError> {
    static CURRENT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("api key pattern compiles"));
    static LEGACY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("api key pattern compiles"));

    if let Some(caps) = CURRENT.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: older page layout
    if let Some(caps) = LEGACY.captures(html) {
        return Ok(caps[1].to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        return Err(BackendError::RequestBlocked);
    }

    Err(BackendError::Parse(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

fn extract_consent_value(html: &str) -> Option<String> {
    static CONSENT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("consent pattern compiles"));
    CONSENT.captures(html).map(|caps| caps[1].to_string())
}

fn check_playability(status: Option<&PlayabilityStatus>, video_id: &str) -> Result<(), BackendError> {
    let Some(status) = status else {
        return Ok(());
    };
    let reason = status.reason.clone().unwrap_or_default();

    match status.status.as_deref() {
        None | Some("OK") => Ok(()),
        Some("LOGIN_REQUIRED") if reason.starts_with(REASON_BOT_CHECK) => Err(BackendError::RequestBlocked),
        Some("LOGIN_REQUIRED") if reason == REASON_AGE_GATE => Err(BackendError::AgeRestricted {
            video_id: video_id.to_string(),
        }),
        Some("ERROR") if reason == REASON_UNAVAILABLE => {
            if video_id.starts_with("http://") || video_id.starts_with("https://") {
                Err(BackendError::InvalidVideoId {
                    video_id: video_id.to_string(),
                })
            } else {
                Err(BackendError::VideoUnavailable {
                    video_id: video_id.to_string(),
                })
            }
        }
        Some(other) => Err(BackendError::VideoUnplayable {
            video_id: video_id.to_string(),
            reason: if reason.is_empty() { other.to_string() } else { reason },
        }),
    }
}

/// Validate a player response and return its tracks, manual before generated
fn caption_tracks_from_player(
    resp: InnerTubePlayerResponse,
    video_id: &str,
) -> Result<Vec<CaptionTrack>, BackendError> {
    check_playability(resp.playability_status.as_ref(), video_id)?;

    let mut tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(BackendError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        });
    }

    // stable: keeps YouTube's order within each group
    tracks.sort_by_key(CaptionTrack::is_generated);
    Ok(tracks)
}

fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    video_id: &str,
    language_code: &str,
) -> Result<&'a CaptionTrack, BackendError> {
    tracks
        .iter()
        .filter(|t| t.language_code == language_code)
        .min_by_key(|t| t.is_generated())
        .ok_or_else(|| BackendError::NoTranscriptFound {
            video_id: video_id.to_string(),
            language: language_code.to_string(),
            available: tracks
                .iter()
                .map(|t| t.language_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

fn clean_caption_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    MARKUP.replace_all(&decoded, "").to_string()
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, BackendError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_dur = None;
            }
            Ok(Event::Empty(_)) => {
                // Self-closing <text .../> with no content
            }
            Ok(Event::Text(ref e)) => {
                if let Some(start) = current_start.take() {
                    let raw_text = e.unescape().unwrap_or_default();
                    let text = clean_caption_text(&raw_text);
                    if !text.trim().is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: current_dur.take().unwrap_or(0.0),
                        });
                    }
                }
                current_dur = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::Parse(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
