//! Remote gateway port (driven/secondary port)
//!
//! One gateway per entity kind translates between local records and the
//! remote wire format. Implementations live in `stocksync-api`.
//!
//! ## Design Notes
//!
//! - Unlike the storage port, gateway errors are classified ([`RemoteError`])
//!   because callers branch on them: transport failures may fall back to
//!   local handling, authentication and business-rule rejections never do.
//! - Gateways return fully normalized records tagged `Synced`.

use thiserror::Error;

use crate::domain::{Branch, Entity, EntityId, Product, Sale, User};

// ============================================================================
// RemoteError
// ============================================================================

/// Classified failure of a remote call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// The call did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Missing or expired credentials
    #[error("Authentication required: {0}")]
    Auth(String),

    /// The server rejected the request on business grounds
    #[error("Rejected by server: {0}")]
    Conflict(String),

    #[error("Not found on server: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// True for transport-level failures (the server was never reached or
    /// never answered)
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Network(_) | RemoteError::Timeout)
    }

    /// True if retrying later could succeed without user action
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Network(_) | RemoteError::Timeout => true,
            RemoteError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// True if the user must log in again
    pub fn requires_reauth(&self) -> bool {
        matches!(self, RemoteError::Auth(_))
    }
}

// ============================================================================
// IRemoteGateway trait
// ============================================================================

/// Port trait for remote operations on one entity kind
#[async_trait::async_trait]
pub trait IRemoteGateway<E: Entity>: Send + Sync {
    /// Creates a record upstream and returns the server's canonical copy
    async fn create(&self, draft: &E::Draft) -> Result<E, RemoteError>;

    /// Retrieves a single record by server id
    async fn fetch(&self, id: &EntityId) -> Result<E, RemoteError>;

    /// Lists every record of this kind visible to the caller
    async fn list(&self) -> Result<Vec<E>, RemoteError>;

    /// Applies a partial update and returns the updated record
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, RemoteError>;

    /// Deletes a record upstream
    async fn delete(&self, id: &EntityId) -> Result<(), RemoteError>;
}

/// Product gateway with server-authoritative stock adjustments
#[async_trait::async_trait]
pub trait IProductGateway: IRemoteGateway<Product> {
    /// Decrements stock on the server; fails with `Conflict` when the
    /// server's quantity is insufficient
    async fn reduce_quantity(&self, id: &EntityId, quantity: u32) -> Result<Product, RemoteError>;

    /// Increments stock on the server
    async fn restore_quantity(&self, id: &EntityId, quantity: u32)
        -> Result<Product, RemoteError>;
}

// ============================================================================
// Syncable
// ============================================================================

/// Binds an entity kind to the gateway flavour its repository holds
pub trait Syncable: Entity {
    type Gateway: ?Sized + IRemoteGateway<Self> + Send + Sync;
}

impl Syncable for Branch {
    type Gateway = dyn IRemoteGateway<Branch>;
}

impl Syncable for User {
    type Gateway = dyn IRemoteGateway<User>;
}

impl Syncable for Product {
    type Gateway = dyn IProductGateway;
}

impl Syncable for Sale {
    type Gateway = dyn IRemoteGateway<Sale>;
}
