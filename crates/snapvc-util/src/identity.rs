//! Author identity lookup.
//!
//! Save operations record who made them. The author name comes from the
//! environment (`USER` on unix, `USERNAME` on windows) and falls back to a
//! fixed sentinel so a record always carries a name.

use tracing::debug;

/// Sentinel author used when no username is available from the environment.
pub const UNKNOWN_USER: &str = "unknown";

/// Resolve the current user's name from the environment.
pub fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| {
            debug!("No USER or USERNAME in environment, using sentinel author");
            UNKNOWN_USER.to_string()
        })
}
