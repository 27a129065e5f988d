//! # fleet-types
//!
//! Shared data model for the scrape-fleet launcher and node bootstrapper.
//!
//! ## Design Principles
//!
//! - A `FleetSpec` is immutable once a launch begins; everything derived
//!   from it (instance names, boot plans) is deterministic
//! - Instance names use a fixed scheme: `{base_name}{index}` for
//!   index in `[1, count]`, so no two requests from one spec collide
//! - Worker identity is parsed from the instance hostname and carried as a
//!   typed value, never as a loose string re-parsed downstream

mod error;
mod identity;
mod plan;
mod report;
mod spec;

pub use error::SpecError;
pub use identity::{GroupId, IDENTITY_TOKEN, MANIFEST_PREFIX};
pub use plan::{BootPlan, Variant};
pub use report::{InstanceOutcome, LaunchReport};
pub use spec::{FleetSpec, InstanceRequest};
