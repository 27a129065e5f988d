//! Fleet specification and derived instance requests.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::SpecError;

/// Everything needed to launch one fleet. Read once, never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetSpec {
    /// Prefix for instance names; index 1..=count is appended.
    pub base_name: String,

    /// Number of instances to create.
    pub count: u32,

    /// Provider zone (e.g. `us-central1-a`).
    pub zone: String,

    /// Provider machine type (e.g. `e2-standard-4`).
    pub machine_type: String,

    /// Boot image for the instances.
    pub image: String,

    /// Local path of the startup script attached to every instance.
    pub boot_script: PathBuf,

    /// Network tags applied to every instance.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl FleetSpec {
    /// Parse a spec from TOML and validate it.
    pub fn from_toml_str(contents: &str) -> Result<Self, SpecError> {
        let spec: FleetSpec = toml::from_str(contents)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the invariants a launch depends on.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.count < 1 {
            return Err(SpecError::InvalidCount(self.count));
        }
        if self.base_name.trim().is_empty() {
            return Err(SpecError::EmptyBaseName);
        }
        if self.zone.is_empty() {
            return Err(SpecError::EmptyField("zone"));
        }
        if self.machine_type.is_empty() {
            return Err(SpecError::EmptyField("machine_type"));
        }
        if self.image.is_empty() {
            return Err(SpecError::EmptyField("image"));
        }
        Ok(())
    }

    /// Derive the per-instance creation requests.
    ///
    /// Exactly `count` requests, named `{base_name}{index}` for index in
    /// `[1, count]`. Deterministic suffixing keeps the names distinct.
    pub fn instance_requests(&self) -> Vec<InstanceRequest> {
        (1..=self.count)
            .map(|index| InstanceRequest {
                name: format!("{}{}", self.base_name, index),
                index,
            })
            .collect()
    }
}

/// One instance-creation request derived from a spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRequest {
    /// Instance name, unique within the fleet.
    pub name: String,

    /// One-based index within the fleet.
    pub index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_spec(count: u32) -> FleetSpec {
        FleetSpec {
            base_name: "yt-scraper".to_string(),
            count,
            zone: "us-central1-a".to_string(),
            machine_type: "e2-standard-4".to_string(),
            image: "debian-12".to_string(),
            boot_script: PathBuf::from("startup.sh"),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn requests_are_named_by_index() {
        let requests = sample_spec(4).instance_requests();
        let names: Vec<_> = requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["yt-scraper1", "yt-scraper2", "yt-scraper3", "yt-scraper4"]
        );
    }

    #[test]
    fn requests_are_distinct_for_any_count() {
        for count in 1..=32 {
            let requests = sample_spec(count).instance_requests();
            assert_eq!(requests.len(), count as usize);
            let unique: HashSet<_> = requests.iter().map(|r| &r.name).collect();
            assert_eq!(unique.len(), count as usize);
        }
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = sample_spec(0).validate().unwrap_err();
        assert!(matches!(err, SpecError::InvalidCount(0)));
    }

    #[test]
    fn empty_base_name_is_rejected() {
        let mut spec = sample_spec(1);
        spec.base_name = "  ".to_string();
        assert!(matches!(spec.validate(), Err(SpecError::EmptyBaseName)));
    }

    #[test]
    fn spec_parses_from_toml() {
        let toml = r#"
base_name = "yt-scraper"
count = 4
zone = "us-central1-a"
machine_type = "e2-standard-4"
image = "debian-12"
boot_script = "startup.sh"
tags = ["scraper", "no-ingress"]
"#;
        let spec = FleetSpec::from_toml_str(toml).unwrap();
        assert_eq!(spec.count, 4);
        assert!(spec.tags.contains("no-ingress"));
    }

    #[test]
    fn invalid_toml_spec_is_rejected() {
        let toml = r#"
base_name = "yt-scraper"
count = 0
zone = "us-central1-a"
machine_type = "e2-standard-4"
image = "debian-12"
boot_script = "startup.sh"
"#;
        assert!(FleetSpec::from_toml_str(toml).is_err());
    }
}
