//! Stock bookkeeping on the sale repository

use super::{EntityRepository, RepositoryError};
use crate::domain::{Entity, EntityId, EntityKind, Product, Sale};

impl EntityRepository<Sale> {
    /// Units of `product` held back by Local sales whose stock has not been
    /// reduced on the server yet
    ///
    /// Sales may reference the product by its current id or by the local id
    /// it had before being synced.
    pub fn held_stock(&self, product: &Product) -> u32 {
        self.records
            .iter()
            .filter(|s| s.holds_stock() && product.answers_to(s.product_id()))
            .map(Sale::quantity)
            .sum()
    }

    /// Records that the server has taken this Local sale's units out of stock
    pub(crate) async fn mark_stock_reduced(&mut self, id: &EntityId) -> Result<Sale, RepositoryError> {
        let index = self.position(id)?;
        if !self.records[index].is_local() {
            return Err(RepositoryError::InvalidState(format!(
                "{} {id} is already synced",
                EntityKind::Sale
            )));
        }

        self.records[index].mark_stock_reduced();
        self.persist().await?;
        Ok(self.records[index].clone())
    }
}
