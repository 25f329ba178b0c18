//! Sale command - record and remove sales

use anyhow::{Context, Result};
use clap::Subcommand;

use stocksync_core::config::Config;
use stocksync_core::domain::{EntityId, SaleDraft};

use super::{create_mode, open_workspace};
use crate::output::{get_formatter, print_record, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale (offline unless --online)
    ///
    /// Online sales reduce the product's stock on the server and then
    /// record the sale. Offline sales leave stock untouched until synced.
    Create {
        #[arg(long)]
        product: EntityId,
        #[arg(long)]
        quantity: u32,
        /// Total charged (defaults to unit price times quantity)
        #[arg(long)]
        total: Option<f64>,
        #[arg(long)]
        seller: Option<EntityId>,
        #[arg(long)]
        customer: Option<String>,
        /// Record on the server immediately
        #[arg(long)]
        online: bool,
    },
    /// Delete a sale
    Delete {
        id: EntityId,
        /// Give the sold units back to the product first
        #[arg(long)]
        restore_stock: bool,
    },
}

impl SaleCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        match self {
            SaleCommand::Create {
                product,
                quantity,
                total,
                seller,
                customer,
                online,
            } => {
                let mut ws = open_workspace(config).await?;

                let total = match total {
                    Some(total) => *total,
                    None => {
                        let unit_price = ws
                            .products
                            .get(product)
                            .map(|p| p.price())
                            .with_context(|| format!("product {product} not found"))?;
                        unit_price * f64::from(*quantity)
                    }
                };

                let mut draft = SaleDraft::new(product.clone(), *quantity, total);
                draft.seller_id = seller.clone();
                draft.customer_name = customer.clone();

                let sale = ws
                    .record_sale(draft, create_mode(*online))
                    .await
                    .context("Failed to record sale")?;

                print_record(format, &*formatter, "Sale recorded", &sale);
            }
            SaleCommand::Delete { id, restore_stock } => {
                let mut ws = open_workspace(config).await?;
                let sale = ws
                    .delete_sale(id, *restore_stock)
                    .await
                    .with_context(|| format!("Failed to delete sale {id}"))?;

                let headline = if *restore_stock {
                    format!("Sale deleted, {} unit(s) returned to stock", sale.quantity())
                } else {
                    "Sale deleted".to_string()
                };
                print_record(format, &*formatter, &headline, &sale);
            }
        }

        Ok(())
    }
}
