//! Sync command - push every Local record to the server
//!
//! Runs the branch, user, product and sale stages in that order. Records
//! that fail stay Local and are retried by the next run; the command then
//! exits with an error so scripts can tell.

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use stocksync_core::config::{Config, API_TOKEN_ENV};
use stocksync_sync::{SyncCoordinator, SyncReport};

use super::open_workspace;
use crate::output::{get_formatter, plural, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        let mut ws = open_workspace(config).await?;
        if ws.status().is_clean() {
            info!("No local records to push");
        }

        let coordinator = SyncCoordinator::new(&config.sync);
        let report = coordinator.run(&mut ws).await;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&report)?);
        } else {
            print_report(&report, &*formatter);
        }
        ensure_complete(&report)
    }
}

/// Fails when any record was left Local
fn ensure_complete(report: &SyncReport) -> Result<()> {
    if !report.is_complete() {
        bail!(
            "{} record{} not synced",
            report.failures.len(),
            plural(report.failures.len())
        );
    }
    Ok(())
}

fn print_report(report: &SyncReport, formatter: &dyn OutputFormatter) {
    let synced = report.synced();
    if report.is_complete() {
        formatter.success(&format!(
            "Sync complete: {synced} record{} pushed in {} ms",
            plural(synced),
            report.duration_ms
        ));
    } else {
        formatter.warn(&format!(
            "Sync finished with {} failure{}: {synced} record{} pushed",
            report.failures.len(),
            plural(report.failures.len()),
            plural(synced)
        ));
    }

    for stage in &report.stages {
        if stage.attempted == 0 {
            continue;
        }
        formatter.info(&format!(
            "{:<10} {} synced, {} skipped, {} failed",
            stage.kind.collection(),
            stage.synced,
            stage.skipped,
            stage.failed
        ));
    }

    for failure in &report.failures {
        formatter.info(&format!(
            "  {} {}: {}",
            failure.kind, failure.local_id, failure.reason
        ));
    }

    if report.requires_reauth() {
        formatter.warn(&format!(
            "The server rejected the API token. Set {API_TOKEN_ENV} or remote.api_token and retry"
        ));
    }
}
