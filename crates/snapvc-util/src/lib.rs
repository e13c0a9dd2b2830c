//! Shared utilities for snapvc.
//!
//! This crate provides common utilities used across the snapvc workspace:
//! - Logging setup with tracing
//! - Author/identity lookup

pub mod identity;
pub mod log;

pub use identity::current_user;
pub use log::{LogConfig, LogLevel};
