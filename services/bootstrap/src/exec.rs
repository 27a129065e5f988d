//! External tool execution.
//!
//! All provider/storage tooling (storage CLI, FUSE utility, package
//! manager) runs behind the [`CommandRunner`] trait so boot-sequence tests
//! can script outcomes without touching the host.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::BootError;

/// Bytes of stderr kept for error detail.
const STDERR_TAIL_BYTES: usize = 512;

/// Result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Exit code, -1 when killed by signal.
    pub code: i32,

    /// Tail of the tool's stderr, for error detail.
    pub stderr_tail: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external tools.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CmdOutput>;
}

/// Real runner that spawns tools on the host.
pub struct HostRunner;

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CmdOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail_start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
        // Avoid splitting a UTF-8 boundary
        let tail_start = (tail_start..stderr.len())
            .find(|&i| stderr.is_char_boundary(i))
            .unwrap_or(stderr.len());

        Ok(CmdOutput {
            code: output.status.code().unwrap_or(-1),
            stderr_tail: stderr[tail_start..].trim_end().to_string(),
        })
    }
}

/// Run a tool and fail on non-zero exit.
pub async fn run_tool(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> Result<(), BootError> {
    let output = runner
        .run(program, args)
        .await
        .map_err(|e| BootError::ToolFailed {
            tool: program.to_string(),
            code: -1,
            detail: e.to_string(),
        })?;

    if !output.success() {
        return Err(BootError::ToolFailed {
            tool: program.to_string(),
            code: output.code,
            detail: output.stderr_tail,
        });
    }

    Ok(())
}
