//! The tracking index.
//!
//! A flat JSON file recording which paths participate in versioning, with
//! the last modification time seen for each. Every rewrite goes through a
//! temp file and an atomic rename, so a crash never leaves a half-written
//! index behind.

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// One tracked path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    pub tracked: bool,
    /// Unix seconds of the file's mtime when last tracked or saved.
    pub last_modified: i64,
}

/// Handle to the on-disk tracking index.
pub struct TrackingIndex {
    path: PathBuf,
}

impl TrackingIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all entries; a missing index file is an empty index.
    pub fn entries(&self) -> StoreResult<Vec<IndexEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a path is currently tracked.
    pub fn is_tracked(&self, path: &str) -> StoreResult<bool> {
        Ok(self
            .entries()?
            .iter()
            .any(|e| e.path == path && e.tracked))
    }

    /// Add a path to the index (or re-mark an existing entry as tracked).
    pub fn track(&self, path: &str, last_modified: i64) -> StoreResult<()> {
        let mut entries = self.entries()?;
        match entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.tracked = true;
                entry.last_modified = last_modified;
            }
            None => entries.push(IndexEntry {
                path: path.to_string(),
                tracked: true,
                last_modified,
            }),
        }
        debug!(path, "Tracking file");
        self.write(&entries)
    }

    /// Remove a path from the index.
    pub fn untrack(&self, path: &str) -> StoreResult<()> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.path != path);
        debug!(path, "Untracking file");
        self.write(&entries)
    }

    /// Refresh the recorded mtime for a tracked path.
    pub fn touch(&self, path: &str, last_modified: i64) -> StoreResult<()> {
        let mut entries = self.entries()?;
        if let Some(entry) = entries.iter_mut().find(|e| e.path == path) {
            entry.last_modified = last_modified;
            self.write(&entries)?;
        }
        Ok(())
    }

    /// Rewrite the index atomically (write to temp file, then rename).
    fn write(&self, entries: &[IndexEntry]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_index(dir: &TempDir) -> TrackingIndex {
        TrackingIndex::new(dir.path().join("index.json"))
    }

    #[test]
    fn test_missing_index_is_empty() {
        let dir = TempDir::new().unwrap();
        let index = new_index(&dir);
        assert!(index.entries().unwrap().is_empty());
        assert!(!index.is_tracked("a.txt").unwrap());
    }

    #[test]
    fn test_track_and_untrack() {
        let dir = TempDir::new().unwrap();
        let index = new_index(&dir);

        index.track("a.txt", 100).unwrap();
        index.track("b.txt", 200).unwrap();
        assert!(index.is_tracked("a.txt").unwrap());
        assert!(index.is_tracked("b.txt").unwrap());

        index.untrack("a.txt").unwrap();
        assert!(!index.is_tracked("a.txt").unwrap());
        assert!(index.is_tracked("b.txt").unwrap());
        assert_eq!(index.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_track_existing_updates_mtime() {
        let dir = TempDir::new().unwrap();
        let index = new_index(&dir);

        index.track("a.txt", 100).unwrap();
        index.track("a.txt", 300).unwrap();

        let entries = index.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].last_modified, 300);
    }

    #[test]
    fn test_touch_updates_only_existing() {
        let dir = TempDir::new().unwrap();
        let index = new_index(&dir);

        index.track("a.txt", 100).unwrap();
        index.touch("a.txt", 500).unwrap();
        index.touch("ghost.txt", 500).unwrap();

        let entries = index.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].last_modified, 500);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let index = new_index(&dir);
        index.track("a.txt", 100).unwrap();
        assert!(!dir.path().join("index.json.tmp").exists());
    }
}
