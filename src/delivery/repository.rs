//! Delivery tracker repository for feedcast.
//!
//! Tracks, per recipient, which fingerprints have already been delivered.
//! Records are presence-only and carry their own TTL, independent of the
//! dedup store's retention window. While a record for `(recipient,
//! fingerprint)` is unexpired the item must not be re-delivered to that
//! recipient; once it expires the item becomes eligible again.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::RetryPolicy;
use crate::Result;

/// Repository for per-recipient delivery records.
pub struct DeliveryRepository<'a> {
    pool: &'a SqlitePool,
    retry: RetryPolicy,
}

impl<'a> DeliveryRepository<'a> {
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

    /// Check whether the fingerprint was already delivered to the
    /// recipient (and the record is unexpired).
    pub async fn delivered(&self, recipient_id: &str, fingerprint: &str) -> Result<bool> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM deliveries
                     WHERE recipient_id = ? AND fingerprint = ? AND expires_at > ?)",
                )
                .bind(recipient_id)
                .bind(fingerprint)
                .bind(now)
                .fetch_one(self.pool)
                .await?;
                Ok(exists)
            })
            .await
    }

    /// Record a delivery, setting the pair's expiry `ttl_secs` from now.
    /// Re-marking an existing pair only refreshes its TTL.
    pub async fn mark_delivered(
        &self,
        recipient_id: &str,
        fingerprint: &str,
        ttl_secs: i64,
    ) -> Result<()> {
        let expires_at = Utc::now().timestamp() + ttl_secs;
        self.retry
            .run(|| async {
                sqlx::query(
                    "INSERT INTO deliveries (recipient_id, fingerprint, expires_at)
                     VALUES (?, ?, ?)
                     ON CONFLICT(recipient_id, fingerprint)
                     DO UPDATE SET expires_at = excluded.expires_at",
                )
                .bind(recipient_id)
                .bind(fingerprint)
                .bind(expires_at)
                .execute(self.pool)
                .await?;
                Ok(())
            })
            .await
    }

    /// Candidate pool for a recipient: `all_fingerprints` minus the
    /// recipient's unexpired delivered set, in the input order.
    ///
    /// An empty result means "nothing to send this cycle", not an error.
    pub async fn available_for(
        &self,
        recipient_id: &str,
        all_fingerprints: &[String],
    ) -> Result<Vec<String>> {
        let now = Utc::now().timestamp();
        let delivered: Vec<String> = self
            .retry
            .run(|| async {
                let rows: Vec<String> = sqlx::query_scalar(
                    "SELECT fingerprint FROM deliveries
                     WHERE recipient_id = ? AND expires_at > ?",
                )
                .bind(recipient_id)
                .bind(now)
                .fetch_all(self.pool)
                .await?;
                Ok(rows)
            })
            .await?;

        let delivered: HashSet<&str> = delivered.iter().map(String::as_str).collect();
        Ok(all_fingerprints
            .iter()
            .filter(|f| !delivered.contains(f.as_str()))
            .cloned()
            .collect())
    }

    /// Delete expired delivery records. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = Utc::now().timestamp();
        self.retry
            .run(|| async {
                let result = sqlx::query("DELETE FROM deliveries WHERE expires_at <= ?")
                    .bind(now)
                    .execute(self.pool)
                    .await?;
                Ok(result.rows_affected())
            })
            .await
    }
}
