//! scrape-fleet node bootstrapper.
//!
//! Runs once at boot on every fleet instance and is responsible for:
//! - Dual-sink boot logging (append-mode file + console)
//! - Worker identity derivation from the instance hostname
//! - Per-group manifest fetch (download variant)
//! - Runtime environment activation
//! - NOFILE rlimit raise
//! - Object-store mount (download variant)
//! - Worker exec with exit-code passthrough
//!
//! The sequence is strictly fail-fast: any step error aborts the boot and
//! the worker is never launched.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

mod config;
mod error;
mod exec;
mod logging;
mod manifest;
mod mount;
mod rlimit;
mod runtime_env;
mod sequence;
mod workload;

use config::BootConfig;

/// Bootstrapper version (semver).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boot log path, appended across restarts.
pub const BOOT_LOG_PATH: &str = "/var/log/node-boot.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging to boot log file
    if let Err(e) = logging::init(BOOT_LOG_PATH) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    let boot_id = uuid::Uuid::new_v4();
    info!(version = VERSION, boot_id = %boot_id, "node-boot starting");

    match run().await {
        Ok(exit_code) => {
            info!(exit_code, "node-boot exiting with worker status");
            ExitCode::from(exit_code as u8)
        }
        Err(e) => {
            error!(error = %e, "node-boot failed");
            // Log the error chain
            let mut source = e.source();
            while let Some(cause) = source {
                error!(cause = %cause, "caused by");
                source = cause.source();
            }
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<i32> {
    let config = BootConfig::from_env()?;
    let plan = config.plan();
    info!(
        variant = %config.variant,
        bucket = %config.bucket,
        env_name = %config.env_name,
        "configuration loaded"
    );

    let hostname = hostname()?;
    let runner = exec::HostRunner;
    let launch = sequence::prepare(&config, &plan, &hostname, &runner).await?;

    info!("launching worker");
    let exit_code = workload::run(launch).await?;

    Ok(exit_code)
}

fn hostname() -> Result<String> {
    let name = nix::unistd::gethostname()?;
    Ok(name.to_string_lossy().into_owned())
}
