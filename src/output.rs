use std::borrow::Cow;

use serde_json::Value;

use crate::Segment;

/// Named-field access to a caption cue, whatever shape it arrived in
pub trait Cue {
    fn text(&self) -> Cow<'_, str>;
    fn start(&self) -> f64;
}

impl Cue for Segment {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn start(&self) -> f64 {
        self.start
    }
}

/// Loosely typed `{"text": .., "start": ..}` records. Missing fields read as
/// empty text and time zero; numeric strings are accepted for `start`.
impl Cue for Value {
    fn text(&self) -> Cow<'_, str> {
        match self.get("text") {
            Some(Value::String(s)) => Cow::Borrowed(s),
            Some(Value::Null) | None => Cow::Borrowed(""),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }

    fn start(&self) -> f64 {
        match self.get("start") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        }
    }
}

/// `[MM:SS]` for a start offset in seconds. Both parts are floored.
pub fn format_timestamp(start: f64) -> String {
    let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
    let minutes = (start / 60.0).floor() as u64;
    let seconds = (start % 60.0).floor() as u64;
    format!("[{minutes:02}:{seconds:02}]")
}

/// Render cues one per line, optionally prefixed with their timestamp
pub fn render_transcript<C: Cue>(cues: &[C], timestamps: bool) -> String {
    cues.iter()
        .map(|cue| {
            if timestamps {
                format!("{} {}", format_timestamp(cue.start()), cue.text())
            } else {
                cue.text().into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_segments() -> Vec<Segment> {
        vec![
            Segment {
                text: "Hello world".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            Segment {
                text: "This is a test".to_string(),
                start: 125.7,
                duration: 2.0,
            },
        ]
    }

    #[test]
    fn test_render_text() {
        let output = render_transcript(&sample_segments(), false);
        assert_eq!(output, "Hello world\nThis is a test");
    }

    #[test]
    fn test_render_with_timestamps() {
        let output = render_transcript(&sample_segments(), true);
        assert_eq!(output, "[00:00] Hello world\n[02:05] This is a test");
    }

    #[test]
    fn test_render_empty() {
        let segments: Vec<Segment> = vec![];
        assert_eq!(render_transcript(&segments, true), "");
    }

    #[test]
    fn test_timestamp_floors() {
        assert_eq!(format_timestamp(125.7), "[02:05]");
        assert_eq!(format_timestamp(59.999), "[00:59]");
        assert_eq!(format_timestamp(60.0), "[01:00]");
    }

    #[test]
    fn test_timestamp_past_an_hour() {
        assert_eq!(format_timestamp(6001.0), "[100:01]");
    }

    #[test]
    fn test_timestamp_negative_clamps() {
        assert_eq!(format_timestamp(-3.2), "[00:00]");
        assert_eq!(format_timestamp(f64::NAN), "[00:00]");
    }

    #[test]
    fn test_json_records_render_like_segments() {
        let records = vec![
            serde_json::json!({"text": "Hello world", "start": 0.0, "duration": 1.5}),
            serde_json::json!({"text": "This is a test", "start": 125.7}),
        ];
        assert_eq!(
            render_transcript(&records, true),
            render_transcript(&sample_segments(), true)
        );
    }

    #[test]
    fn test_json_record_missing_fields() {
        let record = serde_json::json!({"start": "61.5"});
        assert_eq!(record.text(), "");
        assert!((record.start() - 61.5).abs() < f64::EPSILON);
        assert_eq!(render_transcript(&[record], true), "[01:01] ");
    }
}
