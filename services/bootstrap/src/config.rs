//! Configuration for the node bootstrapper.
//!
//! Everything comes from environment variables baked into the instance
//! metadata, with defaults matching the fleet's conventions. Paths that the
//! worker contract fixes (manifest destination, mount point) are constants.

use std::path::PathBuf;

use anyhow::{Context, Result};
use fleet_types::{BootPlan, Variant};

/// Local path the per-group manifest is fetched to.
pub const MANIFEST_LOCAL_PATH: &str = "/tmp/manifest.txt";

/// Mount point for the object-store cookie directory.
pub const MOUNT_POINT: &str = "/mnt/ytdlp-cookies";

/// Object-store subdirectory exposed at the mount point.
pub const MOUNT_SUBDIR: &str = "manifests";

/// Node bootstrapper configuration.
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// Which boot variant this instance runs.
    pub variant: Variant,

    /// Object-store bucket holding manifests and cookies.
    pub bucket: String,

    /// Root of the runtime environment manager installation.
    pub env_root: PathBuf,

    /// Name of the pre-existing runtime environment to activate.
    pub env_name: String,

    /// Working directory the worker is launched from.
    pub work_dir: PathBuf,

    /// Local destination for the fetched manifest.
    pub manifest_path: PathBuf,

    /// Mount point for the object-store subdirectory.
    pub mount_point: PathBuf,

    /// NOFILE limit requested for the worker.
    pub nofile_limit: u64,
}

impl BootConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let variant: Variant = std::env::var("FLEET_VARIANT")
            .unwrap_or_else(|_| "download".to_string())
            .parse()?;

        let bucket = std::env::var("FLEET_BUCKET")
            .unwrap_or_else(|_| "multichannel-podcasts".to_string());

        let env_root = std::env::var("FLEET_ENV_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/opt/conda"));

        let env_name = std::env::var("FLEET_ENV_NAME").unwrap_or_else(|_| "scraper".to_string());

        let work_dir = std::env::var("FLEET_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/opt/scraper"));

        let nofile_limit = parse_nofile_limit(std::env::var("FLEET_NOFILE_LIMIT").ok())?;

        Ok(Self {
            variant,
            bucket,
            env_root,
            env_name,
            work_dir,
            manifest_path: PathBuf::from(MANIFEST_LOCAL_PATH),
            mount_point: PathBuf::from(MOUNT_POINT),
            nofile_limit,
        })
    }

    /// Boot plan for the configured variant.
    pub fn plan(&self) -> BootPlan {
        BootPlan::for_variant(self.variant)
    }
}

/// Parse `FLEET_NOFILE_LIMIT`, defaulting only when the variable is unset.
///
/// A malformed value is a hard error, like a malformed `FLEET_VARIANT`:
/// silently booting with the default would hide a misconfigured instance.
fn parse_nofile_limit(raw: Option<String>) -> Result<u64> {
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("invalid FLEET_NOFILE_LIMIT: {value:?}")),
        None => Ok(crate::rlimit::NOFILE_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(work_dir: PathBuf, env_root: PathBuf) -> BootConfig {
        BootConfig {
            variant: Variant::Download,
            bucket: "multichannel-podcasts".to_string(),
            env_root,
            env_name: "scraper".to_string(),
            work_dir,
            manifest_path: PathBuf::from("/tmp/manifest.txt"),
            mount_point: PathBuf::from("/mnt/ytdlp-cookies"),
            nofile_limit: crate::rlimit::NOFILE_LIMIT,
        }
    }

    #[test]
    fn fixed_paths_match_worker_contract() {
        let config = test_config(PathBuf::from("/opt/scraper"), PathBuf::from("/opt/conda"));
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/manifest.txt"));
        assert_eq!(config.mount_point, PathBuf::from("/mnt/ytdlp-cookies"));
    }

    #[test]
    fn nofile_limit_defaults_when_unset() {
        assert_eq!(
            parse_nofile_limit(None).unwrap(),
            crate::rlimit::NOFILE_LIMIT
        );
        assert_eq!(
            parse_nofile_limit(Some("60000".to_string())).unwrap(),
            60000
        );
    }

    #[test]
    fn malformed_nofile_limit_is_rejected() {
        let err = parse_nofile_limit(Some("plenty".to_string())).unwrap_err();
        assert!(err.to_string().contains("FLEET_NOFILE_LIMIT"));
    }

    #[test]
    fn plan_follows_variant() {
        let mut config = test_config(PathBuf::from("/opt/scraper"), PathBuf::from("/opt/conda"));
        assert!(config.plan().needs_manifest_fetch);

        config.variant = Variant::Scrape;
        assert!(!config.plan().needs_manifest_fetch);
    }
}
