//! Core types: documents, transcripts, date ranges, text helpers, tracing

pub mod document;
pub mod format;
pub mod time;
pub mod tracing;

pub use document::{Document, UNTITLED_MEETING, Utterance, format_transcript_text};
pub use format::{filename_safe, html_escape, rule};
pub use time::{DateRange, parse_timestamp};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
