//! Per-run report logs.
//!
//! Every analysis leaves two files in the logs directory: the plain-text
//! report and the [`AnalysisResult`] as JSON.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use meetcoach_core::filename_safe;
use tracing::debug;

use crate::analyzer::AnalysisResult;
use crate::error::ClientResult;

/// Paths written by [`ReportLog::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    /// The text report.
    pub text: PathBuf,
    /// The JSON result.
    pub json: PathBuf,
}

/// Directory of report logs.
#[derive(Debug, Clone)]
pub struct ReportLog {
    dir: PathBuf,
}

impl ReportLog {
    /// Creates a log rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the logs directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `analysis_<YYYYmmdd_HHMMSS>_<label>.{txt,json}`.
    pub fn save(
        &self,
        report: &str,
        range_label: &str,
        result: &AnalysisResult,
        now: NaiveDateTime,
    ) -> ClientResult<SavedReport> {
        std::fs::create_dir_all(&self.dir)?;

        let stem = format!(
            "analysis_{}_{}",
            now.format("%Y%m%d_%H%M%S"),
            filename_safe(range_label)
        );
        let text = self.dir.join(format!("{}.txt", stem));
        let json = self.dir.join(format!("{}.json", stem));

        std::fs::write(&text, report)?;
        let encoded = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
        std::fs::write(&json, encoded)?;

        debug!(path = %text.display(), "saved report log");
        Ok(SavedReport { text, json })
    }
}
