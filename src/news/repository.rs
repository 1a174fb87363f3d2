//! Dedup store repository for feedcast.
//!
//! Persists the canonical fingerprint of every ingested item with a
//! sliding retention window. Membership is always evaluated against
//! non-expired rows, so an expired fingerprint is indistinguishable from a
//! never-seen one - an accepted, documented staleness bound.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::RetryPolicy;
use crate::Result;

/// Repository for the ingestion dedup store.
pub struct NewsRepository<'a> {
    pool: &'a SqlitePool,
    retry: RetryPolicy,
}

impl<'a> NewsRepository<'a> {
    /// Create a repository with the default retry policy.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a repository with a custom retry policy.
    pub fn with_retry(pool: &'a SqlitePool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Check whether a fingerprint is currently stored (and unexpired).
    pub async fn exists(&self, fingerprint: &str) -> Result<bool> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM news_items WHERE fingerprint = ? AND expires_at > ?)",
                )
                .bind(fingerprint)
                .bind(now)
                .fetch_one(self.pool)
                .await?;
                Ok(exists)
            })
            .await
    }

    /// Insert a fingerprint, setting its expiry `ttl_secs` from now.
    ///
    /// Re-inserting a still-present fingerprint refreshes its TTL: the
    /// retention window slides on every ingest that sees the item.
    pub async fn insert(&self, fingerprint: &str, ttl_secs: i64) -> Result<()> {
        let expires_at = Utc::now().timestamp() + ttl_secs;
        self.retry
            .run(|| async {
                sqlx::query(
                    "INSERT INTO news_items (fingerprint, expires_at) VALUES (?, ?)
                     ON CONFLICT(fingerprint) DO UPDATE SET expires_at = excluded.expires_at",
                )
                .bind(fingerprint)
                .bind(expires_at)
                .execute(self.pool)
                .await?;
                Ok(())
            })
            .await
    }

    /// Number of unexpired fingerprints.
    pub async fn count(&self) -> Result<i64> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM news_items WHERE expires_at > ?")
                        .bind(now)
                        .fetch_one(self.pool)
                        .await?;
                Ok(count)
            })
            .await
    }

    /// All unexpired fingerprints, in insertion order.
    pub async fn all(&self) -> Result<Vec<String>> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let rows: Vec<String> = sqlx::query_scalar(
                    "SELECT fingerprint FROM news_items WHERE expires_at > ? ORDER BY rowid ASC",
                )
                .bind(now)
                .fetch_all(self.pool)
                .await?;
                Ok(rows)
            })
            .await
    }

    /// Delete expired fingerprints. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let result = sqlx::query("DELETE FROM news_items WHERE expires_at <= ?")
                    .bind(now)
                    .execute(self.pool)
                    .await?;
                Ok(result.rows_affected())
            })
            .await
    }
}
