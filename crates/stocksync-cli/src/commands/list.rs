//! List command - show local records of one kind

use anyhow::Result;
use clap::Args;

use stocksync_core::config::Config;
use stocksync_core::domain::EntityKind;
use stocksync_core::ports::Syncable;
use stocksync_core::repository::EntityRepository;

use super::open_workspace;
use crate::output::{get_formatter, plural, OutputFormat, OutputFormatter, RecordLine};

#[derive(Debug, Args)]
pub struct ListCommand {
    /// branches, users, products or sales
    pub kind: EntityKind,

    /// Only records waiting to be synced
    #[arg(long)]
    pub pending: bool,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let ws = open_workspace(config).await?;

        match self.kind {
            EntityKind::Branch => show(&ws.branches, self.pending, format, &*formatter),
            EntityKind::User => show(&ws.users, self.pending, format, &*formatter),
            EntityKind::Product => show(&ws.products, self.pending, format, &*formatter),
            EntityKind::Sale => show(&ws.sales, self.pending, format, &*formatter),
        }
    }
}

fn show<E: Syncable + RecordLine>(
    repo: &EntityRepository<E>,
    pending: bool,
    format: OutputFormat,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let records: Vec<&E> = if pending {
        repo.pending()
    } else {
        repo.list().iter().collect()
    };

    if format.is_json() {
        formatter.print_json(&serde_json::to_value(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        formatter.success(&format!("No {}", E::KIND.collection()));
        return Ok(());
    }

    formatter.success(&format!(
        "{} {}{}",
        records.len(),
        E::KIND,
        plural(records.len())
    ));
    for record in records {
        formatter.info(&record.line());
    }
    Ok(())
}
