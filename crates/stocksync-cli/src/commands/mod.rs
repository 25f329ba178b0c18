//! Subcommands and the wiring they share

pub mod branch;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod product;
pub mod sale;
pub mod status;
pub mod sync;
pub mod user;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use stocksync_api::{ApiClient, BranchGateway, ProductGateway, SaleGateway, UserGateway};
use stocksync_cache::{DatabasePool, SqliteBlobStore};
use stocksync_core::config::Config;
use stocksync_core::domain::EntityId;
use stocksync_core::ports::IBlobStore;
use stocksync_core::repository::{CreateMode, Gateways, Workspace};

/// Opens the local database and wires REST gateways to every repository
pub async fn open_workspace(config: &Config) -> Result<Workspace> {
    let pool = DatabasePool::from_config(&config.storage)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.storage.database.display()
            )
        })?;
    let store: Arc<dyn IBlobStore> = Arc::new(SqliteBlobStore::new(pool.pool().clone()));

    let client = Arc::new(
        ApiClient::from_config(&config.remote).context("Failed to create HTTP client")?,
    );
    debug!(
        base_url = client.base_url(),
        authenticated = client.has_token(),
        "API client ready"
    );

    let gateways = Gateways {
        branches: Arc::new(BranchGateway::new(Arc::clone(&client))),
        users: Arc::new(UserGateway::new(Arc::clone(&client))),
        products: Arc::new(ProductGateway::new(Arc::clone(&client))),
        sales: Arc::new(SaleGateway::new(client)),
    };

    Workspace::load(gateways, store)
        .await
        .context("Failed to load local records")
}

/// `--online` creates on the server now; otherwise the record waits for
/// the next sync
pub fn create_mode(online: bool) -> CreateMode {
    if online {
        CreateMode::Remote
    } else {
        CreateMode::Local
    }
}

/// The company to file a branch or product under: the flag, else the
/// configured default
pub fn company_id(config: &Config, explicit: Option<EntityId>) -> Result<EntityId> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    let configured = config.remote.company_id.clone().context(
        "No company given. Pass --company or set remote.company_id in the configuration",
    )?;
    EntityId::new(configured).context("remote.company_id is not a valid id")
}
