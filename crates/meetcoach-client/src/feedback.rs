//! Daily feedback history.
//!
//! Each day's coaching feedback is kept as `feedback_<YYYYMMDD>.txt`. A
//! re-run on the same day moves the earlier file to a timestamped backup.
//! `current.txt` always holds the latest feedback. The last week of files
//! is fed back into the next analysis as context.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::ClientResult;

/// Name of the file holding the latest feedback.
pub const CURRENT_FILE_NAME: &str = "current.txt";

/// How far back previous feedback is collected, in days.
pub const LOOKBACK_DAYS: i64 = 7;

/// Most previous-feedback files passed on to the prompt.
pub const MAX_PREVIOUS: usize = 3;

static DATED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^feedback_(\d{8})\.txt$").expect("Invalid feedback file regex"));

/// Paths written by [`FeedbackStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFeedback {
    /// The dated feedback file.
    pub path: PathBuf,
    /// Where the earlier same-day file was moved, if there was one.
    pub backup: Option<PathBuf>,
}

/// Directory of daily feedback files.
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    dir: PathBuf,
    current_file: PathBuf,
}

impl FeedbackStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let current_file = dir.join(CURRENT_FILE_NAME);
        Self { dir, current_file }
    }

    /// Returns the feedback directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of `current.txt`.
    pub fn current_file(&self) -> &Path {
        &self.current_file
    }

    /// Returns the dated file path for `date`.
    pub fn dated_file(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("feedback_{}.txt", date.format("%Y%m%d")))
    }

    /// Writes `text` as the feedback for `now`'s date.
    ///
    /// An existing file for the same date is renamed to
    /// `feedback_<YYYYMMDD>_backup_<HHMMSS>.txt` first.
    pub fn save(&self, text: &str, now: NaiveDateTime) -> ClientResult<SavedFeedback> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dated_file(now.date());
        let backup = if path.exists() {
            let backup = self.dir.join(format!(
                "feedback_{}_backup_{}.txt",
                now.format("%Y%m%d"),
                now.format("%H%M%S")
            ));
            std::fs::rename(&path, &backup)?;
            info!(backup = %backup.display(), "backed up earlier feedback");
            Some(backup)
        } else {
            None
        };

        std::fs::write(&path, text)?;
        std::fs::write(&self.current_file, text)?;
        debug!(path = %path.display(), "saved feedback");

        Ok(SavedFeedback { path, backup })
    }

    /// Collects feedback from the week before `today`.
    ///
    /// Only files named exactly `feedback_<YYYYMMDD>.txt` dated 1 to 7 days
    /// before `today` are used, at most [`MAX_PREVIOUS`] of them, newest
    /// first, each headed `[YYYY-MM-DD]`.
    /// Returns `None` if there are none or the directory cannot be read.
    pub fn load_previous(&self, today: NaiveDate) -> Option<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "could not read feedback directory");
                return None;
            }
        };

        let mut files: Vec<(NaiveDate, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let date = parse_dated_name(name.to_str()?)?;
                let days_ago = (today - date).num_days();
                (1..=LOOKBACK_DAYS)
                    .contains(&days_ago)
                    .then(|| (date, entry.path()))
            })
            .collect();

        files.sort_by(|a, b| b.0.cmp(&a.0));
        files.truncate(MAX_PREVIOUS);

        let mut sections = Vec::with_capacity(files.len());
        for (date, path) in files {
            match std::fs::read_to_string(&path) {
                Ok(content) => sections.push(format!("[{}]\n{}", date.format("%Y-%m-%d"), content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read previous feedback");
                    return None;
                }
            }
        }

        if sections.is_empty() {
            None
        } else {
            debug!(days = sections.len(), "loaded previous feedback");
            Some(sections.join("\n\n"))
        }
    }
}

fn parse_dated_name(name: &str) -> Option<NaiveDate> {
    let digits = DATED_FILE.captures(name)?.get(1)?.as_str();
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}
