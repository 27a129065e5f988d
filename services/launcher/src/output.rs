//! Report formatting for the launcher.

use anyhow::{bail, Result};
use colored::Colorize;
use fleet_types::LaunchReport;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format: {} (expected table or json)", other),
        }
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl OutcomeRow {
    fn from_report(report: &LaunchReport) -> Vec<Self> {
        report
            .outcomes
            .iter()
            .map(|o| OutcomeRow {
                name: o.name.clone(),
                status: if o.succeeded() { "created" } else { "failed" },
                detail: o.error.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// Print the launch report in the requested format.
pub fn print_report(report: &LaunchReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows = OutcomeRow::from_report(report);
            println!("{}", Table::new(rows));

            let summary = format!(
                "{} of {} instances created",
                report.succeeded_count(),
                report.requested
            );
            if report.fleet_ok() {
                println!("{} {}", "Success:".green().bold(), summary);
            } else {
                println!("{} {}", "Failed:".red().bold(), summary);
                for outcome in report.failures() {
                    println!(
                        "  {} {}",
                        outcome.name.red(),
                        outcome.error.as_deref().unwrap_or("no outcome recorded")
                    );
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}
