//! Repository configuration.
//!
//! A `config.json` written at `init` pins the bounds the diff engine runs
//! with, so later invocations keep producing the same output for the same
//! history.

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Repository configuration, persisted as `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Context lines around each hunk in rendered diffs.
    pub context_lines: usize,

    /// Maximum number of lines read from a file.
    pub max_lines: usize,

    /// Maximum line length in bytes; longer lines are truncated.
    pub max_line_len: usize,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            max_lines: snapvc_diff::MAX_LINES,
            max_line_len: snapvc_diff::MAX_LINE_LEN,
        }
    }
}

impl RepoConfig {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write configuration atomically (write to temp file, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
