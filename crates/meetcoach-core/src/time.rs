//! Time handling for meeting documents.
//!
//! This module provides [`parse_timestamp`] for normalizing the loosely
//! formatted `created_at` values returned by the notes API, and
//! [`DateRange`] for defining the inclusive window a run analyzes.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Naive formats accepted when a timestamp carries no offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Timestamps with a `Z` suffix or an explicit offset are converted to UTC.
/// Timestamps without any zone information are interpreted as UTC.
/// Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// An inclusive window of time, stored in UTC.
///
/// The `label` is the human description of the window, used in email
/// subjects and report filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start of the range (inclusive).
    pub start: DateTime<Utc>,
    /// End of the range (inclusive).
    pub end: DateTime<Utc>,
    /// Human-readable description.
    pub label: String,
}

impl DateRange {
    /// Creates a range from explicit bounds.
    ///
    /// Returns `None` if `start` is after `end`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: impl Into<String>,
    ) -> Option<Self> {
        (start <= end).then(|| Self {
            start,
            end,
            label: label.into(),
        })
    }

    /// The range from local midnight today until the end of today.
    pub fn today<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        Self {
            start: local_to_utc(&tz, today.and_time(NaiveTime::MIN)),
            end: end_of_day(&tz, today),
            label: format!("Today ({})", today.format("%Y-%m-%d")),
        }
    }

    /// The range from `days` days before `now` until the end of today.
    pub fn last_days<Tz: TimeZone>(days: u32, now: DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let start = now.clone() - Duration::days(i64::from(days));
        Self {
            start: start.with_timezone(&Utc),
            end: end_of_day(&tz, now.date_naive()),
            label: format!("Last {} day(s)", days),
        }
    }

    /// The range covering whole local days from `start` to `end`.
    ///
    /// Returns `None` if `start` is after `end`.
    pub fn between<Tz: TimeZone>(start: NaiveDate, end: NaiveDate, tz: &Tz) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self {
            start: local_to_utc(tz, start.and_time(NaiveTime::MIN)),
            end: end_of_day(tz, end),
            label: format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
        })
    }

    /// Returns true if `dt` falls within the range, bounds included.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_to_utc(tz, date.and_time(last_second))
}

/// Resolves a local wall-clock time, falling back to UTC inside a DST gap.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
