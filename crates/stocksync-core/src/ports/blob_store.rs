//! Blob store port (driven/secondary port)
//!
//! Repositories persist each collection as one serialized document under a
//! string key (`branches`, `users`, `products`, `sales`).
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, filesystem, etc.) and don't need domain-level classification.

/// Port trait for keyed document persistence
#[async_trait::async_trait]
pub trait IBlobStore: Send + Sync {
    /// Reads the document stored under `key`, if any
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Writes (inserts or replaces) the document stored under `key`
    async fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Removes the document stored under `key`; absent keys are not an error
    async fn remove(&self, key: &str) -> anyhow::Result<()>;

    /// Lists all stored keys in ascending order
    async fn keys(&self) -> anyhow::Result<Vec<String>>;
}
