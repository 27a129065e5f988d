//! Worker process launch.
//!
//! The worker runs as a single foreground child with inherited stdio.
//! SIGTERM/SIGINT/SIGHUP are forwarded so provider-initiated shutdowns
//! reach the worker, and its exit code becomes the bootstrapper's own.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use crate::error::BootError;

/// Fully resolved worker invocation produced by the boot sequence.
#[derive(Debug, Clone)]
pub struct WorkerLaunch {
    /// Worker program, resolved relative to `cwd`.
    pub program: String,

    /// Arguments, including the concurrency hint and worker identity.
    pub args: Vec<String>,

    /// Fixed working directory.
    pub cwd: std::path::PathBuf,

    /// Environment applied on top of the inherited one.
    pub env: Vec<(String, String)>,
}

/// Run the worker to completion and return its exit code.
pub async fn run(launch: WorkerLaunch) -> Result<i32> {
    info!(
        program = %launch.program,
        args = ?launch.args,
        cwd = %launch.cwd.display(),
        "starting worker"
    );

    let mut cmd = Command::new(&launch.program);
    cmd.args(&launch.args)
        .current_dir(&launch.cwd)
        .envs(launch.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd
        .spawn()
        .map_err(|e| BootError::WorkerStartFailed(format!("spawn failed: {}", e)))?;

    let child_pid = child.id().expect("child should have pid");
    info!(pid = child_pid, "worker started");

    let exit_status = wait_with_signals(&mut child).await?;
    let exit_code = exit_status.code().unwrap_or(128);

    info!(exit_code, "worker exited");
    Ok(exit_code)
}

/// Wait for worker exit while forwarding signals.
async fn wait_with_signals(child: &mut Child) -> Result<ExitStatus> {
    let child_pid = child.id().expect("child should have pid") as i32;
    let nix_pid = Pid::from_raw(child_pid);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            status = child.wait() => {
                return status.context("failed to wait for worker");
            }

            _ = sigterm.recv() => {
                info!(pid = child_pid, "forwarding SIGTERM to worker");
                let _ = kill(nix_pid, Signal::SIGTERM);
            }

            _ = sigint.recv() => {
                info!(pid = child_pid, "forwarding SIGINT to worker");
                let _ = kill(nix_pid, Signal::SIGINT);
            }

            _ = sighup.recv() => {
                info!(pid = child_pid, "forwarding SIGHUP to worker");
                let _ = kill(nix_pid, Signal::SIGHUP);
            }
        }
    }
}
