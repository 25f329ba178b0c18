//! The four repositories bundled together, with the cross-kind operations
//! that touch more than one of them

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{
    BranchRepository, CreateMode, EntityRepository, ProductRepository, RepositoryError,
    SaleRepository, UserRepository,
};
use crate::domain::{Branch, Entity, EntityId, EntityKind, Sale, SaleDraft, User};
use crate::ports::{IBlobStore, IProductGateway, IRemoteGateway, Syncable};

/// One gateway per entity kind
#[derive(Clone)]
pub struct Gateways {
    pub branches: Arc<dyn IRemoteGateway<Branch>>,
    pub users: Arc<dyn IRemoteGateway<User>>,
    pub products: Arc<dyn IProductGateway>,
    pub sales: Arc<dyn IRemoteGateway<Sale>>,
}

/// Local and synced record counts for one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindStatus {
    pub kind: EntityKind,
    pub local: usize,
    pub synced: usize,
}

/// Snapshot of what is waiting to be pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceStatus {
    pub kinds: Vec<KindStatus>,
}

impl WorkspaceStatus {
    /// Total number of records still Local
    pub fn pending(&self) -> usize {
        self.kinds.iter().map(|k| k.local).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.pending() == 0
    }
}

/// All four repositories, loaded from the same blob store
pub struct Workspace {
    pub branches: BranchRepository,
    pub users: UserRepository,
    pub products: ProductRepository,
    pub sales: SaleRepository,
}

impl Workspace {
    pub async fn load(
        gateways: Gateways,
        store: Arc<dyn IBlobStore>,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            branches: EntityRepository::load(gateways.branches, Arc::clone(&store)).await?,
            users: EntityRepository::load(gateways.users, Arc::clone(&store)).await?,
            products: EntityRepository::load(gateways.products, Arc::clone(&store)).await?,
            sales: EntityRepository::load(gateways.sales, store).await?,
        })
    }

    pub fn status(&self) -> WorkspaceStatus {
        WorkspaceStatus {
            kinds: vec![
                kind_status(&self.branches),
                kind_status(&self.users),
                kind_status(&self.products),
                kind_status(&self.sales),
            ],
        }
    }

    /// Units of a product that can still be sold: its quantity minus what
    /// Local sales already hold
    pub fn available_stock(&self, product_id: &EntityId) -> Result<u32, RepositoryError> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Product, product_id))?;
        Ok(product
            .quantity()
            .saturating_sub(self.sales.held_stock(product)))
    }

    /// Records a sale against a product's stock
    ///
    /// The product's available stock must cover the requested quantity. In
    /// remote mode the stock is reduced on the server and then the sale is
    /// created; if the second step fails the stock stays reduced and
    /// `StockReducedWithoutSale` is returned. In local mode the sale is
    /// stored Local and its quantity is held back from the product until the
    /// sale is pushed, when [`Workspace::reduce_sale_stock`] takes it out of
    /// the server's stock.
    #[tracing::instrument(skip(self, draft), fields(product = %draft.product_id, quantity = draft.quantity))]
    pub async fn record_sale(
        &mut self,
        mut draft: SaleDraft,
        mode: CreateMode,
    ) -> Result<Sale, RepositoryError> {
        Sale::validate_draft(&draft)?;

        let available = self.available_stock(&draft.product_id)?;
        let product = self
            .products
            .get(&draft.product_id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Product, &draft.product_id))?;

        if available < draft.quantity {
            return Err(RepositoryError::InsufficientStock {
                product_id: product.id().clone(),
                available,
                requested: draft.quantity,
            });
        }

        draft.product_id = product.id().clone();
        let product_synced = !product.is_local();
        draft.seller_id = self.current_seller_id(draft.seller_id.take(), mode);

        match mode {
            CreateMode::Local => self.sales.create(draft, CreateMode::Local).await,
            CreateMode::Remote => {
                if !product_synced {
                    return Err(RepositoryError::InvalidState(format!(
                        "product {} has not been synced yet; record the sale offline or sync first",
                        draft.product_id
                    )));
                }

                let product_id = draft.product_id.clone();
                let quantity = draft.quantity;
                self.products.reduce_remote(&product_id, quantity).await?;

                match self.sales.create(draft, CreateMode::Remote).await {
                    Ok(sale) => {
                        info!(sale = %sale.id(), "Sale recorded");
                        Ok(sale)
                    }
                    Err(err) => {
                        warn!(error = %err, "Stock reduced but sale not recorded");
                        Err(RepositoryError::StockReducedWithoutSale {
                            product_id,
                            quantity,
                            source: Box::new(err),
                        })
                    }
                }
            }
        }
    }

    /// Takes a Local sale's units out of the server's stock
    ///
    /// Runs when the sale is pushed, before it is created on the server. The
    /// product must already be synced. Once the reduction succeeds the sale
    /// is flagged, so a retry after a failed create does not reduce twice.
    /// Sales that hold no stock are returned unchanged.
    #[tracing::instrument(skip(self, sale_id), fields(sale = %sale_id))]
    pub async fn reduce_sale_stock(&mut self, sale_id: &EntityId) -> Result<Sale, RepositoryError> {
        let sale = self
            .sales
            .get(sale_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Sale, sale_id))?;
        if !sale.holds_stock() {
            return Ok(sale);
        }

        let product_id = self
            .products
            .get(sale.product_id())
            .map(|p| p.id().clone())
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Product, sale.product_id()))?;
        self.products
            .reduce_remote(&product_id, sale.quantity())
            .await?;

        info!(product = %product_id, quantity = sale.quantity(), "Stock reduced for local sale");
        self.sales.mark_stock_reduced(sale.id()).await
    }

    /// Deletes a sale, optionally giving its quantity back to the product
    ///
    /// When the sale's stock was taken on the server (every Synced sale, and
    /// Local sales already flagged by [`Workspace::reduce_sale_stock`]) and
    /// `restore_stock` is set, stock is restored first and the sale deleted
    /// second; a failure in between is reported as
    /// `StockRestoredWithoutDelete`. A sale that only holds stock locally is
    /// simply removed, which releases the hold.
    #[tracing::instrument(skip(self, id), fields(sale = %id))]
    pub async fn delete_sale(
        &mut self,
        id: &EntityId,
        restore_stock: bool,
    ) -> Result<Sale, RepositoryError> {
        let sale = self
            .sales
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Sale, id))?;

        if sale.holds_stock() || !restore_stock {
            return self.sales.delete(sale.id()).await;
        }

        let product_id = sale.product_id().clone();
        let quantity = sale.quantity();
        self.products.restore_quantity(&product_id, quantity).await?;

        self.sales.delete(sale.id()).await.map_err(|err| {
            warn!(error = %err, "Stock restored but sale not deleted");
            RepositoryError::StockRestoredWithoutDelete {
                sale_id: sale.id().clone(),
                product_id,
                quantity,
                source: Box::new(err),
            }
        })
    }

    /// Maps a seller reference to the user's current id
    ///
    /// Remote sales drop sellers that are not on the server yet, leaving the
    /// server to infer the seller from the caller.
    fn current_seller_id(&self, seller: Option<EntityId>, mode: CreateMode) -> Option<EntityId> {
        let seller = seller?;
        match (self.users.get(&seller), mode) {
            (Some(user), CreateMode::Local) => Some(user.id().clone()),
            (Some(user), CreateMode::Remote) if !user.is_local() => Some(user.id().clone()),
            (None, _) if seller.is_server() => Some(seller),
            (None, CreateMode::Local) => Some(seller),
            _ => None,
        }
    }
}

fn kind_status<E: Syncable>(repo: &EntityRepository<E>) -> KindStatus {
    let local = repo.pending().len();
    KindStatus {
        kind: E::KIND,
        local,
        synced: repo.len() - local,
    }
}
