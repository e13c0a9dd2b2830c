//! Repository operations.
//!
//! A repository lives in a `.snapvc` directory at the working-tree root:
//!
//! ```text
//! .snapvc/
//!   config.json       # RepoConfig
//!   history           # append-only version log (fixed-size records)
//!   index.json        # tracking index
//!   versions/
//!     <file>.<n>      # immutable snapshot of <file> at version <n>
//! ```
//!
//! Snapshots and log records are never mutated after they are written. The
//! two-step save (snapshot copy, then log append) has no rollback: if the
//! append fails, the orphaned snapshot is invisible to version numbering and
//! gets overwritten by the next save. There is no cross-process locking;
//! concurrent saves of the same file can race on version numbers.

use crate::config::RepoConfig;
use crate::error::{StoreError, StoreResult};
use crate::index::TrackingIndex;
use crate::log::VersionLog;
use crate::record::VersionRecord;
use chrono::{DateTime, Utc};
use snapvc_diff::{diff_lines, read_lines_bounded, render_patch};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Repository marker directory name.
pub const REPO_DIR: &str = ".snapvc";

const HISTORY_FILE: &str = "history";
const VERSIONS_DIR: &str = "versions";
const INDEX_FILE: &str = "index.json";
const CONFIG_FILE: &str = "config.json";

/// Result of [`Repository::init`].
pub enum InitOutcome {
    /// Repository created; lists the top-level files imported as version 1.
    Created { imported: Vec<String> },
    /// A repository already exists at this root.
    AlreadyExists,
}

/// State of a tracked file relative to its recorded mtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Clean,
    Modified,
    Deleted,
}

/// One entry of a status listing.
#[derive(Debug, Clone)]
pub struct TrackedStatus {
    pub path: String,
    pub state: FileState,
}

/// An opened snapvc repository.
pub struct Repository {
    root: PathBuf,
    config: RepoConfig,
    log: VersionLog,
    index: TrackingIndex,
}

impl Repository {
    /// Open an existing repository at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let vcs_dir = root.join(REPO_DIR);
        if !vcs_dir.exists() {
            return Err(StoreError::RepositoryMissing);
        }

        let config = RepoConfig::load(vcs_dir.join(CONFIG_FILE))?;
        Ok(Self {
            log: VersionLog::new(vcs_dir.join(HISTORY_FILE)),
            index: TrackingIndex::new(vcs_dir.join(INDEX_FILE)),
            root,
            config,
        })
    }

    /// Create a repository at `root` and import its top-level files.
    ///
    /// Every regular file directly under `root` is tracked and saved as
    /// version 1, so a fresh repository starts with a usable history.
    pub fn init(
        root: impl Into<PathBuf>,
        author: &str,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<InitOutcome> {
        let root = root.into();
        let vcs_dir = root.join(REPO_DIR);
        if vcs_dir.exists() {
            return Ok(InitOutcome::AlreadyExists);
        }

        fs::create_dir_all(vcs_dir.join(VERSIONS_DIR))?;
        let config = RepoConfig::default();
        config.save(vcs_dir.join(CONFIG_FILE))?;

        let repo = Self {
            log: VersionLog::new(vcs_dir.join(HISTORY_FILE)),
            index: TrackingIndex::new(vcs_dir.join(INDEX_FILE)),
            root,
            config,
        };
        repo.log.create()?;

        let mut imported = Vec::new();
        for entry in fs::read_dir(&repo.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == REPO_DIR || !entry.file_type()?.is_file() {
                continue;
            }
            imported.push(name);
        }
        imported.sort();

        for name in &imported {
            repo.track(name, author, timestamp)?;
        }

        info!(root = %repo.root.display(), files = imported.len(), "Initialized repository");
        Ok(InitOutcome::Created { imported })
    }

    /// Repository configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Whether a file is registered in the tracking index.
    pub fn is_tracked(&self, filename: &str) -> StoreResult<bool> {
        self.index.is_tracked(filename)
    }

    /// Register a file in the tracking index and save its first version.
    pub fn track(
        &self,
        filename: &str,
        author: &str,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<VersionRecord> {
        let working = self.root.join(filename);
        if !working.exists() {
            return Err(StoreError::FileMissing(working));
        }
        self.index.track(filename, mtime_secs(&working)?)?;
        self.save(filename, author, timestamp)
    }

    /// Remove a file from the tracking index.
    ///
    /// History and snapshots are append-only and stay untouched.
    pub fn untrack(&self, filename: &str) -> StoreResult<()> {
        if !self.index.is_tracked(filename)? {
            return Err(StoreError::NotTracked(filename.to_string()));
        }
        self.index.untrack(filename)
    }

    /// Version number the next save of `filename` gets.
    pub fn next_version(&self, filename: &str) -> StoreResult<u32> {
        self.log.next_version(filename)
    }

    /// Highest saved version of `filename`, 0 when it has no records.
    pub fn latest_version(&self, filename: &str) -> StoreResult<u32> {
        self.log.latest_version(filename)
    }

    /// All records for `filename`, oldest first.
    pub fn list(&self, filename: &str) -> StoreResult<Vec<VersionRecord>> {
        self.log.for_file(filename)
    }

    /// Every record in the log, oldest first.
    pub fn history(&self) -> StoreResult<Vec<VersionRecord>> {
        self.log.records()
    }

    /// Save a new version of a tracked file.
    ///
    /// Copies the working file into the snapshot directory, diffs it against
    /// the previous snapshot (when one exists) for the record's change
    /// summary, and appends the record to the log.
    pub fn save(
        &self,
        filename: &str,
        author: &str,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<VersionRecord> {
        if !self.index.is_tracked(filename)? {
            return Err(StoreError::NotTracked(filename.to_string()));
        }
        let working = self.root.join(filename);
        if !working.exists() {
            return Err(StoreError::FileMissing(working));
        }

        let version = self.log.next_version(filename)?;
        let snapshot = self.snapshot_file(filename, version);
        if let Some(parent) = snapshot.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&working, &snapshot)?;
        debug!(filename, version, "Wrote snapshot");

        let mut record = VersionRecord::new(filename, author, timestamp, version);
        if version > 1 {
            let prev = self.snapshot_file(filename, version - 1);
            let old_lines = self.read_bounded(&prev)?;
            let new_lines = self.read_bounded(&snapshot)?;
            record = record.with_script(&diff_lines(&old_lines, &new_lines));
        }

        self.log.append(&record)?;
        self.index.touch(filename, mtime_secs(&working)?)?;

        info!(filename, version, "Saved version");
        Ok(record)
    }

    /// Path of the snapshot for `(filename, version)`.
    ///
    /// Fails with `InvalidVersion` when the version is outside `[1, latest]`
    /// or has no corresponding log record.
    pub fn snapshot_path(&self, filename: &str, version: u32) -> StoreResult<PathBuf> {
        let records = self.log.for_file(filename)?;
        let latest = records.iter().map(|r| r.version).max().unwrap_or(0);

        if version < 1 || version > latest || !records.iter().any(|r| r.version == version) {
            return Err(StoreError::InvalidVersion {
                filename: filename.to_string(),
                version,
                latest,
            });
        }
        Ok(self.snapshot_file(filename, version))
    }

    /// Render a patch of the working file against its latest snapshot.
    pub fn diff_against_latest(&self, filename: &str) -> StoreResult<String> {
        let latest = self.log.latest_version(filename)?;
        if latest == 0 {
            return Err(StoreError::HistoryMissing);
        }
        let working = self.root.join(filename);
        if !working.exists() {
            return Err(StoreError::FileMissing(working));
        }

        let snapshot = self.snapshot_file(filename, latest);
        let old_lines = self.read_bounded(&snapshot)?;
        let new_lines = self.read_bounded(&working)?;
        let script = diff_lines(&old_lines, &new_lines);

        let old_label = format!("{}/{}/{}.{}", REPO_DIR, VERSIONS_DIR, filename, latest);
        Ok(render_patch(
            &old_label,
            filename,
            &script,
            self.config.context_lines,
        ))
    }

    /// Overwrite the working file with the snapshot of `version`.
    ///
    /// Read-only with respect to the version log.
    pub fn revert(&self, filename: &str, version: u32) -> StoreResult<()> {
        if !self.index.is_tracked(filename)? {
            return Err(StoreError::NotTracked(filename.to_string()));
        }
        let snapshot = self.snapshot_path(filename, version)?;
        fs::copy(&snapshot, self.root.join(filename))?;
        info!(filename, version, "Reverted to snapshot");
        Ok(())
    }

    /// State of every tracked file.
    pub fn status(&self) -> StoreResult<Vec<TrackedStatus>> {
        let mut statuses = Vec::new();
        for entry in self.index.entries()? {
            if !entry.tracked {
                continue;
            }
            let working = self.root.join(&entry.path);
            let state = if !working.exists() {
                FileState::Deleted
            } else if mtime_secs(&working)? > entry.last_modified {
                FileState::Modified
            } else {
                FileState::Clean
            };
            statuses.push(TrackedStatus {
                path: entry.path,
                state,
            });
        }
        Ok(statuses)
    }

    /// Walk the working tree and report `(path, tracked)` for every file,
    /// skipping the repository directory itself.
    pub fn find(&self) -> StoreResult<Vec<(String, bool)>> {
        let tracked: std::collections::HashSet<String> = self
            .index
            .entries()?
            .into_iter()
            .filter(|e| e.tracked)
            .map(|e| e.path)
            .collect();

        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.file_name().to_string_lossy() != REPO_DIR)
        {
            let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            let is_tracked = tracked.contains(&relative);
            found.push((relative, is_tracked));
        }
        found.sort();
        Ok(found)
    }

    fn snapshot_file(&self, filename: &str, version: u32) -> PathBuf {
        self.root
            .join(REPO_DIR)
            .join(VERSIONS_DIR)
            .join(format!("{filename}.{version}"))
    }

    fn read_bounded(&self, path: &Path) -> StoreResult<Vec<String>> {
        Ok(read_lines_bounded(
            path,
            self.config.max_lines,
            self.config.max_line_len,
        )?)
    }
}

/// File mtime as unix seconds.
fn mtime_secs(path: &Path) -> StoreResult<i64> {
    let mtime = fs::metadata(path)?.modified()?;
    Ok(mtime
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvc_diff::EditKind;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Initialize a repository in an empty temp directory.
    fn setup() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        match Repository::init(dir.path(), "tester", now()).unwrap() {
            InitOutcome::Created { imported } => assert!(imported.is_empty()),
            InitOutcome::AlreadyExists => panic!("fresh temp dir"),
        }
        let repo = Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_open_without_repo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(StoreError::RepositoryMissing)
        ));
    }

    #[test]
    fn test_init_twice_reports_existing() {
        let (dir, _repo) = setup();
        assert!(matches!(
            Repository::init(dir.path(), "tester", now()).unwrap(),
            InitOutcome::AlreadyExists
        ));
    }

    #[test]
    fn test_init_imports_top_level_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("b.txt"), "b\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "nested\n").unwrap();

        let outcome = Repository::init(dir.path(), "tester", now()).unwrap();
        match outcome {
            InitOutcome::Created { imported } => {
                assert_eq!(imported, vec!["a.txt", "b.txt"]);
            }
            InitOutcome::AlreadyExists => panic!("expected creation"),
        }

        let repo = Repository::open(dir.path()).unwrap();
        assert!(repo.is_tracked("a.txt").unwrap());
        assert_eq!(repo.latest_version("a.txt").unwrap(), 1);
        assert!(!repo.is_tracked("sub/nested.txt").unwrap());
    }

    #[test]
    fn test_save_untracked_fails() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "hello\n");
        assert!(matches!(
            repo.save("a.txt", "tester", now()),
            Err(StoreError::NotTracked(_))
        ));
    }

    #[test]
    fn test_save_missing_file_fails() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "hello\n");
        repo.track("a.txt", "tester", now()).unwrap();
        fs::remove_file(dir.path().join("a.txt")).unwrap();
        assert!(matches!(
            repo.save("a.txt", "tester", now()),
            Err(StoreError::FileMissing(_))
        ));
    }

    #[test]
    fn test_versions_are_monotonic_and_gapless() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "v1\n");
        repo.track("a.txt", "tester", now()).unwrap();

        for v in 2..=5u32 {
            write_file(&dir, "a.txt", &format!("content {v}\n"));
            let record = repo.save("a.txt", "tester", now()).unwrap();
            assert_eq!(record.version, v);
        }

        let versions: Vec<u32> = repo
            .list("a.txt")
            .unwrap()
            .iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
        assert_eq!(repo.latest_version("a.txt").unwrap(), 5);
        assert_eq!(repo.next_version("a.txt").unwrap(), 6);
    }

    #[test]
    fn test_first_record_has_zero_counts() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "one\ntwo\n");
        let record = repo.track("a.txt", "tester", now()).unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.lines_added, 0);
        assert_eq!(record.lines_removed, 0);
        assert!(record.changes.is_empty());
    }

    #[test]
    fn test_save_records_change_summary() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "one\ntwo\nthree\n");
        repo.track("a.txt", "tester", now()).unwrap();

        write_file(&dir, "a.txt", "one\nTWO\nthree\nfour\n");
        let record = repo.save("a.txt", "tester", now()).unwrap();

        assert_eq!(record.lines_added, 2);
        assert_eq!(record.lines_removed, 1);
        assert_eq!(record.changes.len(), 3);
        assert!(record.changes.iter().all(|op| op.kind != EditKind::Context));
    }

    #[test]
    fn test_three_saves_list_three_records() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "first\n");
        repo.track("a.txt", "tester", now()).unwrap();
        write_file(&dir, "a.txt", "second\n");
        repo.save("a.txt", "tester", now()).unwrap();
        write_file(&dir, "a.txt", "third\n");
        repo.save("a.txt", "tester", now()).unwrap();

        let records = repo.list("a.txt").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.version).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(records[0].lines_added, 0);
        assert_eq!(records[0].lines_removed, 0);
    }

    #[test]
    fn test_revert_restores_snapshot_exactly() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "original content\n");
        repo.track("a.txt", "tester", now()).unwrap();

        write_file(&dir, "a.txt", "changed content\n");
        repo.save("a.txt", "tester", now()).unwrap();

        repo.revert("a.txt", 1).unwrap();
        let restored = fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(restored, "original content\n");

        // Diffing the working file against snapshot 1 yields no changes.
        let snapshot = repo.snapshot_path("a.txt", 1).unwrap();
        let old = read_lines_bounded(&snapshot, 1000, 256).unwrap();
        let new = read_lines_bounded(dir.path().join("a.txt"), 1000, 256).unwrap();
        let script = diff_lines(&old, &new);
        assert!(script.iter().all(|op| op.kind == EditKind::Context));
    }

    #[test]
    fn test_revert_does_not_touch_log() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "v1\n");
        repo.track("a.txt", "tester", now()).unwrap();
        write_file(&dir, "a.txt", "v2\n");
        repo.save("a.txt", "tester", now()).unwrap();

        repo.revert("a.txt", 1).unwrap();
        assert_eq!(repo.latest_version("a.txt").unwrap(), 2);
        assert_eq!(repo.list("a.txt").unwrap().len(), 2);
    }

    #[test]
    fn test_revert_untracked_fails() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "hello\n");
        assert!(matches!(
            repo.revert("a.txt", 1),
            Err(StoreError::NotTracked(_))
        ));
    }

    #[test]
    fn test_invalid_version_out_of_range() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "v1\n");
        repo.track("a.txt", "tester", now()).unwrap();

        assert!(matches!(
            repo.snapshot_path("a.txt", 0),
            Err(StoreError::InvalidVersion { .. })
        ));
        assert!(matches!(
            repo.snapshot_path("a.txt", 2),
            Err(StoreError::InvalidVersion { latest: 1, .. })
        ));
    }

    #[test]
    fn test_missing_middle_version_is_invalid() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "v1\n");
        repo.track("a.txt", "tester", now()).unwrap();

        // Fabricate a gap: records for versions 1 and 3 only.
        repo.log
            .append(&VersionRecord::new("a.txt", "tester", now(), 3))
            .unwrap();

        assert!(repo.snapshot_path("a.txt", 1).is_ok());
        assert!(matches!(
            repo.snapshot_path("a.txt", 2),
            Err(StoreError::InvalidVersion {
                version: 2,
                latest: 3,
                ..
            })
        ));
        let _ = dir;
    }

    #[test]
    fn test_diff_against_latest() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "one\ntwo\nthree\n");
        repo.track("a.txt", "tester", now()).unwrap();

        write_file(&dir, "a.txt", "one\nTWO\nthree\nfour\n");
        let patch = repo.diff_against_latest("a.txt").unwrap();

        assert!(patch.contains("@@ -1,3 +1,4 @@"));
        assert!(patch.contains("-two"));
        assert!(patch.contains("+TWO"));
        assert!(patch.contains("+four"));
    }

    #[test]
    fn test_diff_without_history_fails() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "hello\n");
        assert!(matches!(
            repo.diff_against_latest("a.txt"),
            Err(StoreError::HistoryMissing)
        ));
    }

    #[test]
    fn test_untrack_keeps_history() {
        let (dir, repo) = setup();
        write_file(&dir, "a.txt", "v1\n");
        repo.track("a.txt", "tester", now()).unwrap();

        repo.untrack("a.txt").unwrap();
        assert!(!repo.is_tracked("a.txt").unwrap());
        assert_eq!(repo.latest_version("a.txt").unwrap(), 1);

        assert!(matches!(
            repo.untrack("a.txt"),
            Err(StoreError::NotTracked(_))
        ));
        let _ = dir;
    }

    #[test]
    fn test_status_states() {
        let (dir, repo) = setup();
        write_file(&dir, "clean.txt", "stays\n");
        write_file(&dir, "gone.txt", "goes away\n");
        repo.track("clean.txt", "tester", now()).unwrap();
        repo.track("gone.txt", "tester", now()).unwrap();

        fs::remove_file(dir.path().join("gone.txt")).unwrap();

        let statuses = repo.status().unwrap();
        let state_of = |path: &str| {
            statuses
                .iter()
                .find(|s| s.path == path)
                .map(|s| s.state)
                .unwrap()
        };
        assert_eq!(state_of("clean.txt"), FileState::Clean);
        assert_eq!(state_of("gone.txt"), FileState::Deleted);
    }

    #[test]
    fn test_find_reports_tracked_flag() {
        let (dir, repo) = setup();
        write_file(&dir, "tracked.txt", "yes\n");
        write_file(&dir, "loose.txt", "no\n");
        repo.track("tracked.txt", "tester", now()).unwrap();

        let found = repo.find().unwrap();
        assert_eq!(
            found,
            vec![
                ("loose.txt".to_string(), false),
                ("tracked.txt".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_nested_file_snapshots() {
        let (dir, repo) = setup();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        write_file(&dir, "src/main.rs", "fn main() {}\n");

        repo.track("src/main.rs", "tester", now()).unwrap();
        let snapshot = repo.snapshot_path("src/main.rs", 1).unwrap();
        assert!(snapshot.exists());

        write_file(&dir, "src/main.rs", "fn main() { run(); }\n");
        repo.save("src/main.rs", "tester", now()).unwrap();
        repo.revert("src/main.rs", 1).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("src/main.rs")).unwrap(),
            "fn main() {}\n"
        );
    }
}
