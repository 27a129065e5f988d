//! Per-instance launch results and the aggregate fleet report.

use serde::Serialize;

use crate::spec::InstanceRequest;

/// Result of one instance-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceOutcome {
    /// Instance name the request carried.
    pub name: String,

    /// One-based index within the fleet.
    pub index: u32,

    /// Error detail when the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceOutcome {
    /// Successful creation.
    pub fn ok(request: &InstanceRequest) -> Self {
        Self {
            name: request.name.clone(),
            index: request.index,
            error: None,
        }
    }

    /// Failed creation with detail.
    pub fn failed(request: &InstanceRequest, detail: impl Into<String>) -> Self {
        Self {
            name: request.name.clone(),
            index: request.index,
            error: Some(detail.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of one fleet launch.
///
/// Outcomes arrive in completion order; [`LaunchReport::finish`] sorts them
/// by index for stable reporting. The fleet is OK only when every requested
/// instance produced a successful outcome.
#[derive(Debug, Serialize)]
pub struct LaunchReport {
    /// Number of instances the spec asked for.
    pub requested: usize,

    /// Per-instance outcomes.
    pub outcomes: Vec<InstanceOutcome>,
}

impl LaunchReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            outcomes: Vec::with_capacity(requested),
        }
    }

    pub fn push(&mut self, outcome: InstanceOutcome) {
        self.outcomes.push(outcome);
    }

    /// Sort outcomes into spec order.
    pub fn finish(&mut self) {
        self.outcomes.sort_by_key(|o| o.index);
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Outcomes that failed, in spec order.
    pub fn failures(&self) -> impl Iterator<Item = &InstanceOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// True only when every requested instance was created.
    ///
    /// A lost outcome (e.g. a panicked dispatch task) counts as failure
    /// even though no error detail exists for it.
    pub fn fleet_ok(&self) -> bool {
        self.outcomes.len() == self.requested && self.outcomes.iter().all(|o| o.succeeded())
    }
}
