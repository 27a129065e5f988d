//! Object-store FUSE mount.
//!
//! The download variant needs the bucket's `manifests` subdirectory visible
//! as local files. The FUSE utility is installed at boot when the image
//! does not already carry it, then the subdirectory is mounted read-write
//! at a fixed mount point.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::BootError;
use crate::exec::{run_tool, CommandRunner};

/// FUSE utility for object-store mounts.
pub const MOUNT_TOOL: &str = "gcsfuse";

/// Package manager used when the utility is missing from the image.
const PACKAGE_MANAGER: &str = "apt-get";

/// Ensure the FUSE utility exists, then mount `subdir` of `bucket` at
/// `mountpoint`.
pub async fn ensure_mounted(
    runner: &dyn CommandRunner,
    bucket: &str,
    subdir: &str,
    mountpoint: &Path,
) -> Result<(), BootError> {
    install_if_missing(runner).await?;

    if !mountpoint.exists() {
        fs::create_dir_all(mountpoint).map_err(|e| BootError::MountFailed {
            detail: format!("failed to create mountpoint: {}", e),
        })?;
    }

    let args = vec![
        "--only-dir".to_string(),
        subdir.to_string(),
        bucket.to_string(),
        mountpoint.display().to_string(),
    ];
    run_tool(runner, MOUNT_TOOL, &args)
        .await
        .map_err(|e| BootError::MountFailed {
            detail: e.to_string(),
        })?;

    info!(
        bucket = %bucket,
        subdir = %subdir,
        mountpoint = %mountpoint.display(),
        "object store mounted"
    );
    Ok(())
}

/// Probe the utility and install it when the probe fails.
async fn install_if_missing(runner: &dyn CommandRunner) -> Result<(), BootError> {
    let probe = vec!["--version".to_string()];
    if run_tool(runner, MOUNT_TOOL, &probe).await.is_ok() {
        return Ok(());
    }

    info!(tool = MOUNT_TOOL, "mount utility missing, installing");
    let install = vec![
        "install".to_string(),
        "-y".to_string(),
        MOUNT_TOOL.to_string(),
    ];
    run_tool(runner, PACKAGE_MANAGER, &install)
        .await
        .map_err(|e| BootError::MountFailed {
            detail: format!("install failed: {}", e),
        })
}
