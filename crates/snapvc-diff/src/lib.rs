//! Line-level difference engine for snapvc.
//!
//! This crate is the stateless half of snapvc: it reads files into bounded
//! line sequences, computes longest-common-subsequence edit scripts, and
//! renders them as context-windowed unified-diff hunks. It owns no persisted
//! data; the version history store drives it.
//!
//! # Example
//!
//! ```
//! use snapvc_diff::{diff_lines, render_patch, EditKind};
//!
//! let old = vec!["one".to_string(), "two".to_string()];
//! let new = vec!["one".to_string(), "TWO".to_string()];
//!
//! let script = diff_lines(&old, &new);
//! assert_eq!(script[0].kind, EditKind::Context);
//!
//! let patch = render_patch("a/file", "b/file", &script, 3);
//! assert!(patch.contains("-two"));
//! assert!(patch.contains("+TWO"));
//! ```

mod error;
mod hunk;
mod lcs;
mod lines;

pub use error::{DiffError, DiffResult};
pub use hunk::{group_hunks, render_patch, Hunk};
pub use lcs::{change_counts, diff_lines, EditKind, EditOp};
pub use lines::{read_lines, read_lines_bounded, MAX_LINES, MAX_LINE_LEN};
