//! The append-only version log.
//!
//! One file, a sequential stream of fixed-size records across all tracked
//! filenames. The only mutation is append; queries scan the whole file.
//! Version numbers are derived by scanning, not by a stored counter, so
//! there is nothing to get out of sync at the cost of an O(history) scan.

use crate::error::{StoreError, StoreResult};
use crate::record::{VersionRecord, RECORD_SIZE};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Handle to the on-disk version log.
pub struct VersionLog {
    path: PathBuf,
}

impl VersionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the log file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create an empty log file.
    pub fn create(&self) -> StoreResult<()> {
        fs::File::create(&self.path)?;
        Ok(())
    }

    /// Append one record to the log.
    pub fn append(&self, record: &VersionRecord) -> StoreResult<()> {
        if !self.exists() {
            return Err(StoreError::HistoryMissing);
        }
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&record.encode())?;
        debug!(
            filename = %record.filename,
            version = record.version,
            "Appended version record"
        );
        Ok(())
    }

    /// Read every record, oldest first.
    ///
    /// A trailing partial record (crash during append) is skipped with a
    /// warning rather than failing the whole scan.
    pub fn records(&self) -> StoreResult<Vec<VersionRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::HistoryMissing)
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::with_capacity(bytes.len() / RECORD_SIZE);
        let mut chunks = bytes.chunks_exact(RECORD_SIZE);
        for chunk in &mut chunks {
            if let Some(record) = VersionRecord::decode(chunk) {
                records.push(record);
            }
        }
        if !chunks.remainder().is_empty() {
            warn!(
                path = %self.path.display(),
                trailing = chunks.remainder().len(),
                "Ignoring partial trailing record in version log"
            );
        }

        Ok(records)
    }

    /// All records for one filename, in log order.
    pub fn for_file(&self, filename: &str) -> StoreResult<Vec<VersionRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.filename == filename)
            .collect())
    }

    /// Highest version number recorded for a filename, 0 when none.
    pub fn latest_version(&self, filename: &str) -> StoreResult<u32> {
        Ok(self
            .for_file(filename)?
            .iter()
            .map(|r| r.version)
            .max()
            .unwrap_or(0))
    }

    /// Version number the next save of this filename gets.
    pub fn next_version(&self, filename: &str) -> StoreResult<u32> {
        Ok(self.latest_version(filename)? + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn new_log(dir: &TempDir) -> VersionLog {
        let log = VersionLog::new(dir.path().join("history"));
        log.create().unwrap();
        log
    }

    #[test]
    fn test_missing_log_is_history_missing() {
        let dir = TempDir::new().unwrap();
        let log = VersionLog::new(dir.path().join("history"));
        assert!(matches!(log.records(), Err(StoreError::HistoryMissing)));
        let record = VersionRecord::new("a.txt", "me", Utc::now(), 1);
        assert!(matches!(log.append(&record), Err(StoreError::HistoryMissing)));
    }

    #[test]
    fn test_append_and_scan() {
        let dir = TempDir::new().unwrap();
        let log = new_log(&dir);

        for v in 1..=3 {
            log.append(&VersionRecord::new("a.txt", "me", Utc::now(), v))
                .unwrap();
        }
        log.append(&VersionRecord::new("b.txt", "me", Utc::now(), 1))
            .unwrap();

        let all = log.records().unwrap();
        assert_eq!(all.len(), 4);

        let for_a = log.for_file("a.txt").unwrap();
        assert_eq!(for_a.len(), 3);
        assert_eq!(
            for_a.iter().map(|r| r.version).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_latest_and_next_version() {
        let dir = TempDir::new().unwrap();
        let log = new_log(&dir);

        assert_eq!(log.latest_version("a.txt").unwrap(), 0);
        assert_eq!(log.next_version("a.txt").unwrap(), 1);

        log.append(&VersionRecord::new("a.txt", "me", Utc::now(), 1))
            .unwrap();
        log.append(&VersionRecord::new("a.txt", "me", Utc::now(), 2))
            .unwrap();

        assert_eq!(log.latest_version("a.txt").unwrap(), 2);
        assert_eq!(log.next_version("a.txt").unwrap(), 3);
        assert_eq!(log.latest_version("other.txt").unwrap(), 0);
    }

    #[test]
    fn test_partial_trailing_record_skipped() {
        let dir = TempDir::new().unwrap();
        let log = new_log(&dir);
        log.append(&VersionRecord::new("a.txt", "me", Utc::now(), 1))
            .unwrap();

        // Simulate a crash mid-append.
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("history"))
            .unwrap();
        file.write_all(&[1u8; 100]).unwrap();

        let records = log.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].version, 1);
    }
}
