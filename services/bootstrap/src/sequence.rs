//! The boot sequence.
//!
//! Strictly sequential and fail-fast: every step either completes or aborts
//! the boot. Nothing is retried and nothing is skipped on failure, so a
//! worker only ever starts from a fully prepared machine.

use fleet_types::{BootPlan, GroupId, IDENTITY_TOKEN};
use tracing::info;

use crate::config::{BootConfig, MOUNT_SUBDIR};
use crate::error::BootError;
use crate::exec::CommandRunner;
use crate::workload::WorkerLaunch;
use crate::{manifest, mount, rlimit, runtime_env};

/// Concurrency hint passed to every worker.
pub const MAX_WORKERS: u32 = 7;

/// Run every preparation step and resolve the worker invocation.
///
/// The worker itself is only launched by the caller once this returns
/// `Ok`, which is what guarantees a failed step never leads to a running
/// worker.
pub async fn prepare(
    config: &BootConfig,
    plan: &BootPlan,
    hostname: &str,
    runner: &dyn CommandRunner,
) -> Result<WorkerLaunch, BootError> {
    // Step 1: derive worker identity from the hostname
    let group = GroupId::from_hostname(hostname, IDENTITY_TOKEN);
    if group.is_empty() && plan.needs_manifest_fetch {
        // An empty identity would resolve to the ambiguous object
        // `group_.txt`; refuse instead of fetching it.
        return Err(BootError::IdentityMissing {
            hostname: hostname.to_string(),
        });
    }
    info!(hostname = %hostname, group = %group, "worker identity derived");

    // Step 2: fetch this group's manifest
    if plan.needs_manifest_fetch {
        info!("fetching manifest");
        manifest::fetch(runner, &config.bucket, &group, &config.manifest_path).await?;
    }

    // Step 3: activate the runtime environment
    info!(name = %config.env_name, "activating runtime environment");
    let env = runtime_env::activate(&config.env_root, &config.env_name)?;

    // Step 4: raise the NOFILE limit
    rlimit::raise_nofile(config.nofile_limit)?;

    // Step 5: mount the object store
    if plan.needs_object_mount {
        info!("mounting object store");
        mount::ensure_mounted(runner, &config.bucket, MOUNT_SUBDIR, &config.mount_point).await?;
    }

    // Step 6: resolve the worker invocation
    let mut env_vars = env.env_vars();
    env_vars.push(("VM_ID".to_string(), group.as_str().to_string()));

    Ok(WorkerLaunch {
        program: plan.worker_program.clone(),
        args: vec![
            "--max_workers".to_string(),
            MAX_WORKERS.to_string(),
            "--vm-id".to_string(),
            group.as_str().to_string(),
        ],
        cwd: config.work_dir.clone(),
        env: env_vars,
    })
}
