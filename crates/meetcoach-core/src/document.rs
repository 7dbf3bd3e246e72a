//! Meeting documents and their transcripts.
//!
//! A [`Document`] is the notes service's record of one meeting. The
//! service returns documents without transcripts; the transcript is
//! fetched separately and attached locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::parse_timestamp;

/// Title shown for documents the service returned without one.
pub const UNTITLED_MEETING: &str = "Untitled Meeting";

/// Speaker shown for utterances without a source.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// One spoken line of a transcript.
///
/// Missing and `null` fields both fall back to defaults, so one sparse line
/// never invalidates the rest of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Who spoke. The wire format calls this field `source`.
    #[serde(
        rename = "source",
        default = "unknown_speaker",
        deserialize_with = "speaker_or_unknown"
    )]
    pub speaker: String,
    /// What was said.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub text: String,
}

fn unknown_speaker() -> String {
    UNKNOWN_SPEAKER.to_string()
}

fn speaker_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_speaker))
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Utterance {
    /// Creates a new utterance.
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// A meeting document as listed by the notes service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque, unique identifier.
    pub id: String,
    /// Meeting title, if the service has one.
    #[serde(default)]
    pub title: Option<String>,
    /// Creation time as sent by the service (ISO-8601, zone optional).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Transcript in chronological order; attached after fetch.
    #[serde(default, skip_deserializing)]
    pub transcript: Vec<Utterance>,
}

impl Document {
    /// Creates a document without a transcript.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            created_at: Some(created_at.into()),
            transcript: Vec::new(),
        }
    }

    /// Returns the title, or a placeholder for untitled meetings.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => UNTITLED_MEETING,
        }
    }

    /// Returns the creation time normalized to UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Returns the attached transcript rendered as text.
    pub fn transcript_text(&self) -> String {
        format_transcript_text(&self.transcript)
    }
}

/// Renders utterances as `speaker: text` lines, in order.
///
/// An empty transcript renders as an empty string.
pub fn format_transcript_text(transcript: &[Utterance]) -> String {
    transcript
        .iter()
        .map(|u| format!("{}: {}", u.speaker, u.text))
        .collect::<Vec<_>>()
        .join("\n")
}
