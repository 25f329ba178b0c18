//! User command - create sellers and managers

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use stocksync_core::config::Config;
use stocksync_core::domain::{Entity, EntityId, UserDraft, UserRole};

use super::{create_mode, open_workspace};
use crate::output::{get_formatter, print_record, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user (offline unless --online)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// admin, manager or seller
        #[arg(long, default_value = "seller")]
        role: UserRole,
        /// Branch the user works at; local branch ids are accepted
        #[arg(long)]
        branch: Option<EntityId>,
        /// Create on the server immediately
        #[arg(long)]
        online: bool,
    },
}

impl UserCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        match self {
            UserCommand::Create {
                name,
                email,
                role,
                branch,
                online,
            } => {
                let mut ws = open_workspace(config).await?;

                let mut draft = UserDraft::new(name.clone(), email.clone(), *role);
                if let Some(branch) = branch {
                    // Store the branch's current id if it is known locally
                    let branch_id = ws
                        .branches
                        .get(branch)
                        .map(|b| b.id().clone())
                        .unwrap_or_else(|| branch.clone());
                    if *online && branch_id.is_local() {
                        bail!("Branch {branch_id} has not been synced yet; run 'stocksync sync' first or omit --online");
                    }
                    draft = draft.at_branch(branch_id);
                }

                let user = ws
                    .users
                    .create(draft, create_mode(*online))
                    .await
                    .context("Failed to create user")?;

                print_record(format, &*formatter, "User created", &user);
            }
        }

        Ok(())
    }
}
