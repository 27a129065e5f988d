//! Error types for the node bootstrapper.

use thiserror::Error;

/// Bootstrap errors with standardized reason codes.
#[derive(Debug, Error)]
pub enum BootError {
    /// Hostname carries no identity suffix but the plan needs one.
    #[error("identity_missing: hostname '{hostname}' has no group suffix")]
    IdentityMissing { hostname: String },

    /// Per-group manifest could not be fetched.
    #[error("manifest_fetch_failed: {object}: {detail}")]
    ManifestFetchFailed { object: String, detail: String },

    /// Named runtime environment does not exist.
    #[error("env_missing: no environment '{name}' under {root}")]
    EnvMissing { name: String, root: String },

    /// NOFILE limit could not be raised.
    #[error("rlimit_failed: {0}")]
    RlimitFailed(nix::Error),

    /// Object-store mount failed.
    #[error("mount_failed: {detail}")]
    MountFailed { detail: String },

    /// An external tool exited non-zero.
    #[error("tool_failed: {tool} exited {code}: {detail}")]
    ToolFailed {
        tool: String,
        code: i32,
        detail: String,
    },

    /// Worker process could not be spawned.
    #[error("worker_start_failed: {0}")]
    WorkerStartFailed(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BootError {
    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            BootError::IdentityMissing { .. } => "identity_missing",
            BootError::ManifestFetchFailed { .. } => "manifest_fetch_failed",
            BootError::EnvMissing { .. } => "env_missing",
            BootError::RlimitFailed(_) => "rlimit_failed",
            BootError::MountFailed { .. } => "mount_failed",
            BootError::ToolFailed { .. } => "tool_failed",
            BootError::WorkerStartFailed(_) => "worker_start_failed",
            BootError::Io(_) => "io_error",
        }
    }
}
