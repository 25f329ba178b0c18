//! Repository error types

use crate::domain::{DomainError, EntityId, EntityKind};
use crate::ports::RemoteError;

/// Errors returned by repository and workspace operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Rejected before any I/O
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),

    /// A gateway call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: EntityId,
        available: u32,
        requested: u32,
    },

    /// The operation does not apply to the record's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Reading or writing the blob store failed
    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),

    /// Stock was reduced on the server but the sale was not recorded
    #[error("Stock of product {product_id} reduced by {quantity} but the sale was not recorded: {source}")]
    StockReducedWithoutSale {
        product_id: EntityId,
        quantity: u32,
        #[source]
        source: Box<RepositoryError>,
    },

    /// Stock was restored on the server but the sale was not deleted
    #[error("Stock of product {product_id} restored by {quantity} but sale {sale_id} was not deleted: {source}")]
    StockRestoredWithoutDelete {
        sale_id: EntityId,
        product_id: EntityId,
        quantity: u32,
        #[source]
        source: Box<RepositoryError>,
    },
}

impl RepositoryError {
    pub(crate) fn not_found(kind: EntityKind, id: &EntityId) -> Self {
        RepositoryError::NotFound {
            kind,
            id: id.clone(),
        }
    }

    /// The remote failure at the root of this error, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            RepositoryError::Remote(err) => Some(err),
            RepositoryError::StockReducedWithoutSale { source, .. }
            | RepositoryError::StockRestoredWithoutDelete { source, .. } => source.remote(),
            _ => None,
        }
    }

    /// True if the user must log in again before retrying
    pub fn requires_reauth(&self) -> bool {
        self.remote().is_some_and(RemoteError::requires_reauth)
    }
}
