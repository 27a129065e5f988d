//! Per-group manifest fetch.
//!
//! The download variant pulls `gs://<bucket>/manifests/group_<ID>.txt` to a
//! fixed local path before the worker starts. A missing object fails the
//! boot; there is no fallback input.

use std::path::Path;

use fleet_types::GroupId;
use tracing::info;

use crate::error::BootError;
use crate::exec::{run_tool, CommandRunner};

/// Storage CLI used for object copies.
pub const STORAGE_TOOL: &str = "gsutil";

/// Fetch this group's manifest into `dest`.
pub async fn fetch(
    runner: &dyn CommandRunner,
    bucket: &str,
    group: &GroupId,
    dest: &Path,
) -> Result<(), BootError> {
    let object = group.manifest_object(bucket);
    let args = vec![
        "cp".to_string(),
        object.clone(),
        dest.display().to_string(),
    ];

    run_tool(runner, STORAGE_TOOL, &args)
        .await
        .map_err(|e| match e {
            BootError::ToolFailed { code, detail, .. } => BootError::ManifestFetchFailed {
                object: object.clone(),
                detail: format!("exit {}: {}", code, detail),
            },
            other => other,
        })?;

    info!(object = %object, dest = %dest.display(), "manifest fetched");
    Ok(())
}
