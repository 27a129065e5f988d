//! File-descriptor limit handling.
//!
//! The worker holds many concurrent network connections open; the default
//! NOFILE soft limit is far too low for it.

use nix::sys::resource::{setrlimit, Resource};
use tracing::info;

use crate::error::BootError;

/// NOFILE limit the worker needs.
pub const NOFILE_LIMIT: u64 = 50_000;

/// Raise the NOFILE soft and hard limits to `limit`.
pub fn raise_nofile(limit: u64) -> Result<(), BootError> {
    setrlimit(Resource::RLIMIT_NOFILE, limit, limit).map_err(BootError::RlimitFailed)?;
    info!(limit, "NOFILE limit raised");
    Ok(())
}
