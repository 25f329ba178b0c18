//! Status command - how many records are waiting to be pushed

use anyhow::Result;
use clap::Args;

use stocksync_core::config::Config;

use super::open_workspace;
use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let ws = open_workspace(config).await?;
        let status = ws.status();

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "pending": status.pending(),
                "clean": status.is_clean(),
                "kinds": status.kinds,
            }));
            return Ok(());
        }

        if status.is_clean() {
            formatter.success("Everything is synced");
        } else {
            let pending = status.pending();
            formatter.success(&format!(
                "{pending} record{} waiting for sync",
                plural(pending)
            ));
        }
        for kind in &status.kinds {
            formatter.info(&format!(
                "{:<10} {:>5} local  {:>5} synced",
                kind.kind.collection(),
                kind.local,
                kind.synced
            ));
        }
        Ok(())
    }
}
