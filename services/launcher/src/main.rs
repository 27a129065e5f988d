//! scrape-fleet launcher.
//!
//! Reads a fleet spec, dispatches one instance-creation request per worker
//! to the cloud provider in parallel, and reports a per-instance result.
//! Creation requests are independent: one failure never aborts the others,
//! but any failure makes the overall launch fail.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod dispatch;
mod guard;
mod output;
mod provider;

use output::OutputFormat;
use provider::{GcloudProvider, MockProvider, Provider};

/// Launch a fleet of scrape worker instances.
#[derive(Debug, Parser)]
#[command(name = "fleet-launch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the fleet spec TOML file.
    #[arg(long)]
    spec: PathBuf,

    /// Output format (table or json).
    #[arg(long, default_value = "table")]
    format: String,

    /// Log what would be created without calling the provider.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "launch failed");
            let mut source = e.source();
            while let Some(cause) = source {
                error!(cause = %cause, "caused by");
                source = cause.source();
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let format = OutputFormat::parse(&cli.format)?;
    let spec = config::load_spec(&cli.spec)?;
    info!(
        base_name = %spec.base_name,
        count = spec.count,
        zone = %spec.zone,
        "fleet spec loaded"
    );

    let provider: Arc<dyn Provider> = if cli.dry_run {
        info!("dry run: using mock provider");
        Arc::new(MockProvider::new())
    } else {
        Arc::new(GcloudProvider::new())
    };

    let provisioned = guard::is_provisioned_host(guard::METADATA_URL).await;
    let report = match launch_unless_provisioned(&spec, provider, provisioned).await {
        Some(report) => report,
        None => return Ok(ExitCode::from(2)),
    };

    output::print_report(&report, format);

    Ok(if report.fleet_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Dispatch the fleet unless the provisioned-host guard tripped.
///
/// A launcher running on one of its own instances would fork the fleet
/// recursively; in that case no creation request may be issued at all.
async fn launch_unless_provisioned(
    spec: &fleet_types::FleetSpec,
    provider: Arc<dyn Provider>,
    provisioned: bool,
) -> Option<fleet_types::LaunchReport> {
    if provisioned {
        error!("running on a provisioned instance, refusing to launch a fleet");
        return None;
    }

    Some(dispatch::launch_fleet(spec, provider, dispatch::DISPATCH_TIMEOUT).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use fleet_types::FleetSpec;

    #[tokio::test]
    async fn guard_trip_issues_zero_creation_requests() {
        let spec = FleetSpec {
            base_name: "yt-scraper".to_string(),
            count: 4,
            zone: "us-central1-a".to_string(),
            machine_type: "e2-standard-4".to_string(),
            image: "debian-12".to_string(),
            boot_script: PathBuf::from("startup.sh"),
            tags: BTreeSet::new(),
        };
        let provider = Arc::new(MockProvider::new());

        let report =
            launch_unless_provisioned(&spec, Arc::clone(&provider) as _, true).await;

        assert!(report.is_none());
        assert!(provider.requested().is_empty());
    }
}
