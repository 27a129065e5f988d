//! Boot plan variants.
//!
//! The fleet ships two worker flavors that share the same boot sequence and
//! differ only in whether they pull a manifest, whether they mount the
//! object store, and which worker program they exec. One parameterized plan
//! replaces what used to be two near-duplicate startup scripts.

use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;

/// Shipped boot variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Downloads audio from a per-group manifest; needs the manifest fetch
    /// and the cookie mount.
    Download,
    /// Scrapes channel metadata; no per-group inputs.
    Scrape,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Download => "download",
            Variant::Scrape => "scrape",
        }
    }
}

impl FromStr for Variant {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "download" => Ok(Variant::Download),
            "scrape" => Ok(Variant::Scrape),
            other => Err(SpecError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one instance does at boot, beyond the shared steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootPlan {
    /// Fetch the per-group manifest before launching the worker.
    pub needs_manifest_fetch: bool,

    /// Mount the object-store subdirectory before launching the worker.
    pub needs_object_mount: bool,

    /// Worker program to exec, resolved relative to the working directory.
    pub worker_program: String,
}

impl BootPlan {
    /// Plan for a shipped variant.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Download => Self {
                needs_manifest_fetch: true,
                needs_object_mount: true,
                worker_program: "./download.py".to_string(),
            },
            Variant::Scrape => Self {
                needs_manifest_fetch: false,
                needs_object_mount: false,
                worker_program: "./scrape.py".to_string(),
            },
        }
    }
}
