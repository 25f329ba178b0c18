//! SQLite implementation of IBlobStore
//!
//! One row per collection in the `blobs` table:
//!
//! | Column       | SQL Type | Content                           |
//! |--------------|----------|-----------------------------------|
//! | `key`        | TEXT     | collection key, e.g. `products`   |
//! | `value`      | TEXT     | JSON array of records             |
//! | `updated_at` | TEXT     | RFC 3339 timestamp of last write  |

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use stocksync_core::ports::IBlobStore;

use crate::CacheError;

/// SQLite-backed document store
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    /// Creates a store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// When the document under `key` was last written
    pub async fn updated_at(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row = sqlx::query("SELECT updated_at FROM blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("updated_at")))
    }
}

#[async_trait::async_trait]
impl IBlobStore for SqliteBlobStore {
    async fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(CacheError::from)?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO blobs (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&updated_at)
        .execute(&self.pool)
        .await
        .map_err(CacheError::from)?;

        tracing::trace!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM blobs WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(CacheError::from)?;

        tracing::trace!(key, "Removed blob");
        Ok(())
    }

    async fn keys(&self) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM blobs ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(CacheError::from)?;

        Ok(rows.iter().map(|r| r.get("key")).collect())
    }
}
