//! Stock adjustments on the product repository

use tracing::{info, warn};

use super::{EntityRepository, RepositoryError};
use crate::domain::{DomainError, Entity, EntityId, Product};

/// How a quantity reduction was applied
#[derive(Debug, Clone, PartialEq)]
pub enum ReductionOutcome {
    /// The server decremented its stock; the local copy mirrors it
    Remote(Product),
    /// The server was unreachable; only the local copy was decremented
    LocalFallback(Product),
    /// The product exists only locally and was decremented in place
    Local(Product),
}

impl ReductionOutcome {
    pub fn product(&self) -> &Product {
        match self {
            ReductionOutcome::Remote(p)
            | ReductionOutcome::LocalFallback(p)
            | ReductionOutcome::Local(p) => p,
        }
    }

    pub fn into_product(self) -> Product {
        match self {
            ReductionOutcome::Remote(p)
            | ReductionOutcome::LocalFallback(p)
            | ReductionOutcome::Local(p) => p,
        }
    }

    /// True if the server has not seen this reduction
    pub fn is_optimistic(&self) -> bool {
        matches!(self, ReductionOutcome::LocalFallback(_))
    }
}

impl EntityRepository<Product> {
    /// Reduces a product's quantity by `n`
    ///
    /// Synced products are decremented on the server first. Only a transport
    /// failure (network or timeout) falls back to an optimistic local
    /// decrement; rejections such as insufficient server stock propagate.
    /// Local products are decremented in place. The quantity never goes
    /// below zero.
    #[tracing::instrument(skip(self, id), fields(product = %id))]
    pub async fn reduce_quantity(
        &mut self,
        id: &EntityId,
        n: u32,
    ) -> Result<ReductionOutcome, RepositoryError> {
        let index = self.stock_position(id, n)?;

        if self.records[index].is_local() {
            let product = self.take_locally(index, n).await?;
            return Ok(ReductionOutcome::Local(product));
        }

        match self.reduce_on_server(index, n).await {
            Ok(product) => Ok(ReductionOutcome::Remote(product)),
            Err(RepositoryError::Remote(err)) if err.is_transport() => {
                warn!(error = %err, "Server unreachable, reducing stock locally");
                let product = self.take_locally(index, n).await?;
                Ok(ReductionOutcome::LocalFallback(product))
            }
            Err(err) => Err(err),
        }
    }

    /// Reduces stock on the server only, without any local fallback
    pub(crate) async fn reduce_remote(
        &mut self,
        id: &EntityId,
        n: u32,
    ) -> Result<Product, RepositoryError> {
        let index = self.stock_position(id, n)?;
        if self.records[index].is_local() {
            return Err(RepositoryError::InvalidState(format!(
                "product {id} has not been synced yet"
            )));
        }
        self.reduce_on_server(index, n).await
    }

    /// Increases a product's quantity by `n`
    ///
    /// Synced products are restored on the server; there is no local
    /// fallback for restoration.
    #[tracing::instrument(skip(self, id), fields(product = %id))]
    pub async fn restore_quantity(
        &mut self,
        id: &EntityId,
        n: u32,
    ) -> Result<Product, RepositoryError> {
        let index = self.position(id)?;

        let product = if self.records[index].is_local() {
            let mut product = self.records[index].clone();
            product.return_stock(n);
            product
        } else {
            let server_id = self.records[index].id().clone();
            let fresh = self.gateway.restore_quantity(&server_id, n).await?;
            info!(quantity = fresh.quantity(), "Stock restored on server");
            self.carry_origin(index, fresh)
        };

        self.records[index] = product.clone();
        self.persist().await?;
        Ok(product)
    }

    fn stock_position(&self, id: &EntityId, n: u32) -> Result<usize, RepositoryError> {
        if n == 0 {
            return Err(DomainError::invalid("quantity", "must be at least 1").into());
        }
        self.position(id)
    }

    async fn reduce_on_server(&mut self, index: usize, n: u32) -> Result<Product, RepositoryError> {
        let server_id = self.records[index].id().clone();
        let fresh = self.gateway.reduce_quantity(&server_id, n).await?;
        info!(quantity = fresh.quantity(), "Stock reduced on server");

        let fresh = self.carry_origin(index, fresh);
        self.records[index] = fresh.clone();
        self.persist().await?;
        Ok(fresh)
    }

    async fn take_locally(&mut self, index: usize, n: u32) -> Result<Product, RepositoryError> {
        let mut product = self.records[index].clone();
        let available = product.quantity();
        if available < n {
            return Err(RepositoryError::InsufficientStock {
                product_id: product.id().clone(),
                available,
                requested: n,
            });
        }
        product.take_stock(n)?;

        self.records[index] = product.clone();
        self.persist().await?;
        Ok(product)
    }
}
