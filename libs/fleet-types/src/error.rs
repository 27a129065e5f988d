//! Error types for fleet spec parsing and validation.

use thiserror::Error;

/// Errors raised while loading or validating a fleet spec.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Spec TOML could not be parsed.
    #[error("spec parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// Instance count must be at least one.
    #[error("instance count must be >= 1 (got {0})")]
    InvalidCount(u32),

    /// Base name is empty or would produce unusable instance names.
    #[error("base_name must not be empty")]
    EmptyBaseName,

    /// A required spec field is empty.
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Unknown boot variant name.
    #[error("unknown boot variant: {0} (expected 'download' or 'scrape')")]
    UnknownVariant(String),
}
