//! StockSync Cache - Local record persistence
//!
//! SQLite-based storage for the serialized record collections held by the
//! core repositories (branches, users, products, sales).
//!
//! ## Architecture
//!
//! This crate implements the `IBlobStore` port from `stocksync-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteBlobStore`] - `IBlobStore` implementation over a single table
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use stocksync_cache::{DatabasePool, SqliteBlobStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/stocksync/stocksync.db")).await?;
//! let store = SqliteBlobStore::new(pool.pool().clone());
//! // Use store as IBlobStore...
//! # Ok(())
//! # }
//! ```

pub mod blob_store;
pub mod pool;

pub use blob_store::SqliteBlobStore;
pub use pool::DatabasePool;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
