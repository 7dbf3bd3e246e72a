//! Processed-document ledger.
//!
//! Remembers which documents earlier runs analyzed so `--new-only` can skip
//! them. The file is `{"processed_documents": [id, ...]}` and is rewritten
//! whole on every mutation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientResult;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    processed_documents: Vec<String>,
}

/// Set of processed document IDs, persisted as JSON.
///
/// IDs keep their insertion order on disk.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    processed: Vec<String>,
}

impl Ledger {
    /// Loads the ledger, falling back to an empty one.
    ///
    /// A missing, unreadable, or corrupt file is logged as a warning and
    /// treated as empty. Losing the ledger only means meetings get analyzed
    /// again.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let processed = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<LedgerFile>(&content) {
                Ok(file) => file.processed_documents,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ledger is corrupt, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no ledger file found, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read ledger, starting empty");
                Vec::new()
            }
        };

        debug!(count = processed.len(), "loaded ledger");
        Self { path, processed }
    }

    /// Returns the ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if `document_id` was analyzed before.
    pub fn is_processed(&self, document_id: &str) -> bool {
        self.processed.iter().any(|id| id == document_id)
    }

    /// Returns the processed IDs in insertion order.
    pub fn processed(&self) -> &[String] {
        &self.processed
    }

    /// Records `document_id` and writes the ledger.
    ///
    /// Re-marking an ID leaves membership unchanged but still writes the
    /// file. A write failure is logged, not returned.
    pub fn mark_processed(&mut self, document_id: &str) {
        if !self.is_processed(document_id) {
            self.processed.push(document_id.to_string());
        }
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "failed to save ledger");
        }
    }

    /// Writes the ledger to disk.
    pub fn save(&self) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = LedgerFile {
            processed_documents: self.processed.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn on_disk(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn mark_appends_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis_state.json");
        std::fs::write(&path, r#"{"processed_documents": ["doc1", "doc2"]}"#).unwrap();

        let mut ledger = Ledger::load(&path);
        assert!(ledger.is_processed("doc1"));
        assert!(!ledger.is_processed("doc3"));

        ledger.mark_processed("doc3");
        assert_eq!(
            on_disk(&path),
            json!({"processed_documents": ["doc1", "doc2", "doc3"]})
        );

        ledger.mark_processed("doc3");
        assert_eq!(ledger.processed(), ["doc1", "doc2", "doc3"]);
        assert_eq!(
            on_disk(&path),
            json!({"processed_documents": ["doc1", "doc2", "doc3"]})
        );
    }

    #[test]
    fn remark_still_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis_state.json");
        std::fs::write(&path, r#"{"processed_documents":["doc1"]}"#).unwrap();

        let mut ledger = Ledger::load(&path);
        ledger.mark_processed("doc1");

        // The compact input was replaced by pretty output.
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains('\n'));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::load(dir.path().join("nested/analysis_state.json"));
        assert!(ledger.processed().is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis_state.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut ledger = Ledger::load(&path);
        assert!(ledger.processed().is_empty());

        ledger.mark_processed("doc1");
        assert_eq!(on_disk(&path), json!({"processed_documents": ["doc1"]}));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/analysis_state.json");
        let mut ledger = Ledger::load(&path);
        ledger.mark_processed("doc1");
        assert!(path.exists());
    }
}
