//! Version history store for snapvc.
//!
//! This crate owns everything persisted under the `.snapvc` repository
//! directory:
//! - an append-only version log of fixed-size binary records
//! - an immutable snapshot directory with one full copy per saved version
//! - the tracking index of participating file paths
//! - the repository configuration
//!
//! The [`Repository`] type ties these together and drives the diff engine
//! from `snapvc-diff` to populate per-version change summaries.
//!
//! # Example
//!
//! ```no_run
//! use snapvc_store::Repository;
//! use chrono::Utc;
//!
//! # fn example() -> snapvc_store::StoreResult<()> {
//! let repo = Repository::open(".")?;
//! let record = repo.save("notes.txt", "alice", Utc::now())?;
//! println!("saved version {}", record.version);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod index;
mod log;
mod record;
mod repo;

pub use config::RepoConfig;
pub use error::{StoreError, StoreResult};
pub use index::{IndexEntry, TrackingIndex};
pub use log::VersionLog;
pub use record::{VersionRecord, MAX_EMBEDDED_CHANGES, RECORD_SIZE};
pub use repo::{FileState, InitOutcome, Repository, TrackedStatus, REPO_DIR};
