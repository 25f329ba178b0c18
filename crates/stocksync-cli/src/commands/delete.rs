//! Delete command - remove a record of any kind

use anyhow::{Context, Result};
use clap::Args;

use stocksync_core::config::Config;
use stocksync_core::domain::{EntityId, EntityKind};

use super::open_workspace;
use crate::output::{get_formatter, OutputFormat};

/// Synced records are deleted on the server first; Local records only
/// locally. Use `sale delete --restore-stock` to give units back.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl DeleteCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let mut ws = open_workspace(config).await?;
        let id = &self.id;

        let removed = match self.kind {
            EntityKind::Branch => ws.branches.delete(id).await.map(serde_json::to_value),
            EntityKind::User => ws.users.delete(id).await.map(serde_json::to_value),
            EntityKind::Product => ws.products.delete(id).await.map(serde_json::to_value),
            EntityKind::Sale => ws.sales.delete(id).await.map(serde_json::to_value),
        }
        .with_context(|| format!("Failed to delete {} {id}", self.kind))??;

        if format.is_json() {
            formatter.print_json(&serde_json::json!({ "deleted": removed }));
        } else {
            formatter.success(&format!("Deleted {} {id}", self.kind));
        }
        Ok(())
    }
}
