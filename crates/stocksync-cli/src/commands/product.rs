//! Product command - create products and adjust stock

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;

use stocksync_core::config::Config;
use stocksync_core::domain::{EntityId, ProductDraft, ProductPatch};
use stocksync_core::repository::ReductionOutcome;

use super::{company_id, create_mode, open_workspace};
use crate::output::{get_formatter, print_record, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Create a product (offline unless --online)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0)]
        quantity: u32,
        /// Owning company (defaults to remote.company_id)
        #[arg(long)]
        company: Option<EntityId>,
        /// Extra attribute as key=value (repeatable)
        #[arg(long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, Value)>,
        /// Create on the server immediately
        #[arg(long)]
        online: bool,
    },
    /// Change name, price or quantity
    Update {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<u32>,
    },
    /// Take units out of stock
    Reduce { id: EntityId, quantity: u32 },
    /// Put units back into stock
    Restore { id: EntityId, quantity: u32 },
}

/// Parses `key=value`; the value is read as JSON when possible
/// (`weight=45`, `refillable=true`), else kept as a string
fn parse_attribute(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("attribute key must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

impl ProductCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        match self {
            ProductCommand::Create {
                name,
                price,
                quantity,
                company,
                attributes,
                online,
            } => {
                let mut draft = ProductDraft::new(
                    company_id(config, company.clone())?,
                    name.clone(),
                    *price,
                    *quantity,
                );
                draft.attributes = attributes.iter().cloned().collect::<BTreeMap<_, _>>();

                let mut ws = open_workspace(config).await?;
                let product = ws
                    .products
                    .create(draft, create_mode(*online))
                    .await
                    .context("Failed to create product")?;

                print_record(format, &*formatter, "Product created", &product);
            }
            ProductCommand::Update {
                id,
                name,
                price,
                quantity,
            } => {
                let patch = ProductPatch {
                    name: name.clone(),
                    price: *price,
                    quantity: *quantity,
                    ..Default::default()
                };

                let mut ws = open_workspace(config).await?;
                let product = ws
                    .products
                    .update(id, patch)
                    .await
                    .with_context(|| format!("Failed to update product {id}"))?;

                print_record(format, &*formatter, "Product updated", &product);
            }
            ProductCommand::Reduce { id, quantity } => {
                let mut ws = open_workspace(config).await?;
                let outcome = ws
                    .products
                    .reduce_quantity(id, *quantity)
                    .await
                    .with_context(|| format!("Failed to reduce stock of product {id}"))?;

                if let ReductionOutcome::LocalFallback(_) = outcome {
                    formatter.warn(
                        "Server unreachable: stock was reduced locally only and will not be pushed",
                    );
                }
                print_record(
                    format,
                    &*formatter,
                    &format!("Stock reduced by {quantity}"),
                    outcome.product(),
                );
            }
            ProductCommand::Restore { id, quantity } => {
                let mut ws = open_workspace(config).await?;
                let product = ws
                    .products
                    .restore_quantity(id, *quantity)
                    .await
                    .with_context(|| format!("Failed to restore stock of product {id}"))?;

                print_record(
                    format,
                    &*formatter,
                    &format!("Stock restored by {quantity}"),
                    &product,
                );
            }
        }

        Ok(())
    }
}
