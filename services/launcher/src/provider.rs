//! Cloud provider interface and implementations.
//!
//! The provider abstracts instance creation: the real implementation
//! shells out to the cloud CLI, and a mock implementation backs tests and
//! dry runs.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use fleet_types::{FleetSpec, InstanceRequest};
use tokio::process::Command;
use tracing::{debug, info};

/// Instance creation interface.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create one instance. Errors are isolated to this request.
    async fn create_instance(&self, spec: &FleetSpec, request: &InstanceRequest) -> Result<()>;
}

/// Provider backed by the cloud CLI.
pub struct GcloudProvider {
    gcloud_path: String,
}

impl GcloudProvider {
    pub fn new() -> Self {
        Self {
            gcloud_path: "gcloud".to_string(),
        }
    }

    /// CLI arguments for one creation request.
    fn create_args(spec: &FleetSpec, request: &InstanceRequest) -> Vec<String> {
        let mut args = vec![
            "compute".to_string(),
            "instances".to_string(),
            "create".to_string(),
            request.name.clone(),
            "--zone".to_string(),
            spec.zone.clone(),
            "--machine-type".to_string(),
            spec.machine_type.clone(),
            "--image".to_string(),
            spec.image.clone(),
            "--metadata-from-file".to_string(),
            format!("startup-script={}", spec.boot_script.display()),
        ];

        if !spec.tags.is_empty() {
            args.push("--tags".to_string());
            args.push(
                spec.tags
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }

        args
    }
}

impl Default for GcloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GcloudProvider {
    async fn create_instance(&self, spec: &FleetSpec, request: &InstanceRequest) -> Result<()> {
        let args = Self::create_args(spec, request);
        debug!(name = %request.name, "invoking cloud CLI");

        // Dispatch drops this future on timeout; the CLI child must die
        // with it, or a "timed out" outcome could still create an instance
        let output = Command::new(&self.gcloud_path)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "cloud CLI exited {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim_end()
            );
        }

        info!(name = %request.name, zone = %spec.zone, "instance created");
        Ok(())
    }
}

/// Mock provider for tests and dry runs.
pub struct MockProvider {
    /// Instance names whose creation should fail.
    fail_names: HashSet<String>,

    /// Simulated provider latency.
    delay: Duration,

    /// Names of instances "created" so far, in call order.
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            fail_names: HashSet::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that fails creation for the given instance names.
    #[allow(dead_code)] // Used by dispatch tests
    pub fn failing<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self {
            fail_names: names.into_iter().map(Into::into).collect(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add simulated latency to every call.
    #[allow(dead_code)] // Used by dispatch tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Names the mock has been asked to create, in call order.
    #[allow(dead_code)] // Used by dispatch tests
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn create_instance(&self, spec: &FleetSpec, request: &InstanceRequest) -> Result<()> {
        self.calls.lock().unwrap().push(request.name.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_names.contains(&request.name) {
            bail!("mock provider configured to fail {}", request.name);
        }

        info!(
            name = %request.name,
            zone = %spec.zone,
            machine_type = %spec.machine_type,
            "[MOCK] instance created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn sample_spec() -> FleetSpec {
        FleetSpec {
            base_name: "yt-scraper".to_string(),
            count: 2,
            zone: "us-central1-a".to_string(),
            machine_type: "e2-standard-4".to_string(),
            image: "debian-12".to_string(),
            boot_script: PathBuf::from("/opt/fleet/startup.sh"),
            tags: BTreeSet::from(["scraper".to_string()]),
        }
    }

    #[test]
    fn create_args_carry_the_full_spec() {
        let spec = sample_spec();
        let request = InstanceRequest {
            name: "yt-scraper1".to_string(),
            index: 1,
        };

        let args = GcloudProvider::create_args(&spec, &request);
        assert_eq!(args[..4], ["compute", "instances", "create", "yt-scraper1"]);
        assert!(args.contains(&"--zone".to_string()));
        assert!(args.contains(&"us-central1-a".to_string()));
        assert!(args.contains(&"startup-script=/opt/fleet/startup.sh".to_string()));
        assert!(args.contains(&"--tags".to_string()));
        assert!(args.contains(&"scraper".to_string()));
    }

    #[test]
    fn create_args_omit_empty_tags() {
        let mut spec = sample_spec();
        spec.tags.clear();
        let request = InstanceRequest {
            name: "yt-scraper1".to_string(),
            index: 1,
        };

        let args = GcloudProvider::create_args(&spec, &request);
        assert!(!args.contains(&"--tags".to_string()));
    }

    #[tokio::test]
    async fn timed_out_creation_kills_the_cli_child() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = dir.path().join("hung-cli.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho $$ > {}\nsleep 600\n", pid_file.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let provider = GcloudProvider {
            gcloud_path: script.display().to_string(),
        };
        let spec = sample_spec();
        let request = InstanceRequest {
            name: "yt-scraper1".to_string(),
            index: 1,
        };

        let result =
            tokio::time::timeout(Duration::from_millis(500), provider.create_instance(&spec, &request))
                .await;
        assert!(result.is_err(), "hung CLI should hit the timeout");

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        // The child must be killed when the future is dropped; give the
        // runtime a moment to deliver the signal and reap.
        let mut gone = false;
        for _ in 0..50 {
            match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
                Err(_) => {
                    gone = true;
                    break;
                }
                Ok(stat) if stat.contains(") Z ") => {
                    gone = true;
                    break;
                }
                Ok(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        assert!(gone, "CLI child {pid} survived the dropped request");
    }

    #[tokio::test]
    async fn mock_provider_records_and_fails_on_request() {
        let spec = sample_spec();
        let mock = MockProvider::failing(["yt-scraper2"]);

        let first = InstanceRequest {
            name: "yt-scraper1".to_string(),
            index: 1,
        };
        let second = InstanceRequest {
            name: "yt-scraper2".to_string(),
            index: 2,
        };

        assert!(mock.create_instance(&spec, &first).await.is_ok());
        assert!(mock.create_instance(&spec, &second).await.is_err());
        assert_eq!(mock.requested(), vec!["yt-scraper1", "yt-scraper2"]);
    }
}
