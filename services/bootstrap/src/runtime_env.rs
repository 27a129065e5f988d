//! Runtime environment activation.
//!
//! The worker needs a named, pre-existing environment (interpreter plus
//! dependency set) under the environment manager root. Instead of shelling
//! through an activation script, we resolve the environment prefix and hand
//! the worker the variables activation would have set.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::BootError;

/// An activated runtime environment.
#[derive(Debug, Clone)]
pub struct RuntimeEnv {
    /// Environment name.
    pub name: String,

    /// Environment prefix directory.
    pub prefix: PathBuf,
}

/// Resolve a named environment under `root`, failing if it does not exist.
pub fn activate(root: &Path, name: &str) -> Result<RuntimeEnv, BootError> {
    let prefix = root.join("envs").join(name);
    if !prefix.is_dir() {
        return Err(BootError::EnvMissing {
            name: name.to_string(),
            root: root.display().to_string(),
        });
    }

    info!(name = %name, prefix = %prefix.display(), "runtime environment activated");
    Ok(RuntimeEnv {
        name: name.to_string(),
        prefix,
    })
}

impl RuntimeEnv {
    /// Environment variables equivalent to activating this environment.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        let bin = self.prefix.join("bin");
        let path = match std::env::var("PATH") {
            Ok(existing) => format!("{}:{}", bin.display(), existing),
            Err(_) => bin.display().to_string(),
        };

        vec![
            ("PATH".to_string(), path),
            ("CONDA_PREFIX".to_string(), self.prefix.display().to_string()),
            ("CONDA_DEFAULT_ENV".to_string(), self.name.clone()),
        ]
    }
}
