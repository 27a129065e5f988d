//! Fleet spec loading for the launcher.

use std::path::Path;

use anyhow::{Context, Result};
use fleet_types::FleetSpec;

/// Load and validate a fleet spec from a TOML file.
///
/// A relative `boot_script` is resolved against the spec file's directory,
/// and must exist: the provider attaches it verbatim to every instance, so
/// a bad path would only surface after the fleet booted.
pub fn load_spec(path: &Path) -> Result<FleetSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fleet spec: {}", path.display()))?;

    let mut spec = FleetSpec::from_toml_str(&contents)
        .with_context(|| format!("invalid fleet spec: {}", path.display()))?;

    if spec.boot_script.is_relative() {
        if let Some(dir) = path.parent() {
            spec.boot_script = dir.join(&spec.boot_script);
        }
    }

    if !spec.boot_script.is_file() {
        anyhow::bail!(
            "boot script not found: {}",
            spec.boot_script.display()
        );
    }

    Ok(spec)
}
