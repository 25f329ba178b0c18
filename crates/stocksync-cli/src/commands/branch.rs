//! Branch command - create store locations

use anyhow::{Context, Result};
use clap::Subcommand;

use stocksync_core::config::Config;
use stocksync_core::domain::{BranchDraft, EntityId};

use super::{company_id, create_mode, open_workspace};
use crate::output::{get_formatter, print_record, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    /// Create a branch (offline unless --online)
    Create {
        #[arg(long)]
        name: String,
        /// Owning company (defaults to remote.company_id)
        #[arg(long)]
        company: Option<EntityId>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Create on the server immediately
        #[arg(long)]
        online: bool,
    },
}

impl BranchCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        match self {
            BranchCommand::Create {
                name,
                company,
                address,
                phone,
                online,
            } => {
                let draft = BranchDraft {
                    address: address.clone(),
                    phone: phone.clone(),
                    ..BranchDraft::new(company_id(config, company.clone())?, name.clone())
                };

                let mut ws = open_workspace(config).await?;
                let branch = ws
                    .branches
                    .create(draft, create_mode(*online))
                    .await
                    .context("Failed to create branch")?;

                print_record(format, &*formatter, "Branch created", &branch);
            }
        }

        Ok(())
    }
}
