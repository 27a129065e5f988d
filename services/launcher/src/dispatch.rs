//! Parallel fleet dispatch.
//!
//! One task per instance-creation request, all fired without waiting on
//! each other, joined at a single barrier. Tasks share nothing mutable;
//! each reads the spec and produces one outcome. A per-request timeout
//! keeps a hung provider call from stalling the barrier forever.

use std::sync::Arc;
use std::time::Duration;

use fleet_types::{FleetSpec, InstanceOutcome, LaunchReport};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::provider::Provider;

/// Timeout for a single instance-creation request.
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Dispatch every creation request in parallel and aggregate the results.
///
/// A failed request is logged and surfaced in the report; it never aborts
/// sibling requests. The report is complete when this returns: one outcome
/// per request, in spec order, unless a dispatch task panicked (which
/// leaves the report short and therefore not `fleet_ok`).
pub async fn launch_fleet(
    spec: &FleetSpec,
    provider: Arc<dyn Provider>,
    per_request_timeout: Duration,
) -> LaunchReport {
    let requests = spec.instance_requests();
    let mut report = LaunchReport::new(requests.len());

    info!(count = requests.len(), "dispatching fleet");

    let mut tasks = JoinSet::new();
    for request in requests {
        let provider = Arc::clone(&provider);
        let spec = spec.clone();

        tasks.spawn(async move {
            let created = tokio::time::timeout(
                per_request_timeout,
                provider.create_instance(&spec, &request),
            )
            .await;

            match created {
                Ok(Ok(())) => InstanceOutcome::ok(&request),
                Ok(Err(e)) => {
                    warn!(name = %request.name, error = %e, "instance creation failed");
                    InstanceOutcome::failed(&request, format!("{:#}", e))
                }
                Err(_) => {
                    warn!(name = %request.name, "instance creation timed out");
                    InstanceOutcome::failed(
                        &request,
                        format!("timed out after {}s", per_request_timeout.as_secs()),
                    )
                }
            }
        });
    }

    // Dispatch barrier: wait for every request, whatever its outcome
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => report.push(outcome),
            Err(e) => error!(error = %e, "dispatch task panicked"),
        }
    }

    report.finish();
    info!(
        requested = report.requested,
        succeeded = report.succeeded_count(),
        "dispatch complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use rstest::rstest;

    use crate::provider::MockProvider;

    fn spec(count: u32) -> FleetSpec {
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

    #[tokio::test]
    async fn four_instances_all_succeed() {
        let provider = Arc::new(MockProvider::new());
        let report = launch_fleet(&spec(4), Arc::clone(&provider) as _, DISPATCH_TIMEOUT).await;

        assert!(report.fleet_ok());
        assert_eq!(report.succeeded_count(), 4);
        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["yt-scraper1", "yt-scraper2", "yt-scraper3", "yt-scraper4"]
        );
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(16)]
    #[tokio::test]
    async fn exactly_count_requests_with_distinct_names(#[case] count: u32) {
        let provider = Arc::new(MockProvider::new());
        let report =
            launch_fleet(&spec(count), Arc::clone(&provider) as _, DISPATCH_TIMEOUT).await;

        let requested = provider.requested();
        assert_eq!(requested.len(), count as usize);
        let unique: HashSet<_> = requested.iter().collect();
        assert_eq!(unique.len(), count as usize);
        assert!(report.fleet_ok());
    }

    #[tokio::test]
    async fn one_failure_is_isolated_and_surfaced() {
        let provider = Arc::new(MockProvider::failing(["yt-scraper2"]));
        let report = launch_fleet(&spec(4), Arc::clone(&provider) as _, DISPATCH_TIMEOUT).await;

        assert!(!report.fleet_ok());
        assert_eq!(report.succeeded_count(), 3);

        let failed: Vec<_> = report.failures().map(|o| o.name.as_str()).collect();
        assert_eq!(failed, vec!["yt-scraper2"]);

        // Siblings were still dispatched
        assert_eq!(provider.requested().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_requests_time_out() {
        let provider =
            Arc::new(MockProvider::new().with_delay(Duration::from_secs(3600)));
        let report = launch_fleet(
            &spec(2),
            Arc::clone(&provider) as _,
            Duration::from_secs(30),
        )
        .await;

        assert!(!report.fleet_ok());
        assert_eq!(report.succeeded_count(), 0);
        for outcome in report.failures() {
            assert!(outcome.error.as_deref().unwrap().contains("timed out"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_dispatched_in_parallel() {
        let delay = Duration::from_millis(100);
        let provider = Arc::new(MockProvider::new().with_delay(delay));

        let started = tokio::time::Instant::now();
        let report = launch_fleet(&spec(8), Arc::clone(&provider) as _, DISPATCH_TIMEOUT).await;
        let elapsed = started.elapsed();

        assert!(report.fleet_ok());
        // Serial dispatch would need 8x the delay; parallel needs ~1x
        assert!(elapsed < delay * 2, "dispatch took {:?}", elapsed);
    }
}
