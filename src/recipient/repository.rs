//! Recipient registry repository for feedcast.
//!
//! Recipients are opaque identifiers, created on first registration and
//! never removed by the core.

use sqlx::SqlitePool;

use crate::db::RetryPolicy;
use crate::Result;

/// Repository for the recipient registry.
pub struct RecipientRepository<'a> {
    pool: &'a SqlitePool,
    retry: RetryPolicy,
}

impl<'a> RecipientRepository<'a> {
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

    /// Register a recipient. Returns whether it was already registered,
    /// so callers can pick a welcome-vs-repeat response.
    pub async fn register(&self, recipient_id: &str) -> Result<bool> {
        let already: bool = self
            .retry
            .run(|| async {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipients WHERE id = ?)")
                        .bind(recipient_id)
                        .fetch_one(self.pool)
                        .await?;
                Ok(exists)
            })
            .await?;

        if already {
            return Ok(true);
        }

        self.retry
            .run(|| async {
                sqlx::query("INSERT INTO recipients (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
                    .bind(recipient_id)
                    .execute(self.pool)
                    .await?;
                Ok(())
            })
            .await?;

        Ok(false)
    }

    /// All registered recipient identifiers.
    pub async fn all(&self) -> Result<Vec<String>> {
        self.retry
            .run(|| async {
                let rows: Vec<String> =
                    sqlx::query_scalar("SELECT id FROM recipients ORDER BY rowid ASC")
                        .fetch_all(self.pool)
                        .await?;
                Ok(rows)
            })
            .await
    }

    /// Number of registered recipients.
    pub async fn count(&self) -> Result<i64> {
        self.retry
            .run(|| async {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipients")
                    .fetch_one(self.pool)
                    .await?;
                Ok(count)
            })
            .await
    }

    /// Persist a durable snapshot of the registry.
    ///
    /// The underlying write only happens when no snapshot exists yet;
    /// repeated calls are no-ops. Check-then-write is not atomic against
    /// concurrent registers - an occasional single-cycle staleness in the
    /// snapshot is acceptable. Returns whether a write was performed.
    pub async fn snapshot(&self) -> Result<bool> {
        let exists: bool = self
            .retry
            .run(|| async {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipient_snapshots")
                    .fetch_one(self.pool)
                    .await?;
                Ok(count > 0)
            })
            .await?;

        if exists {
            return Ok(false);
        }

        self.retry
            .run(|| async {
                sqlx::query(
                    "INSERT INTO recipient_snapshots (id)
                     SELECT id FROM recipients WHERE true
                     ON CONFLICT(id) DO NOTHING",
                )
                .execute(self.pool)
                .await?;
                Ok(())
            })
            .await?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_register_new_then_repeat() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = RecipientRepository::new(db.pool());

        let already = repo.register("chat-100").await.unwrap();
        assert!(!already);

        let already = repo.register("chat-100").await.unwrap();
        assert!(already);

        // Member count rose by exactly one
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_all_lists_registered() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = RecipientRepository::new(db.pool());

        repo.register("chat-1").await.unwrap();
        repo.register("chat-2").await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all, vec!["chat-1".to_string(), "chat-2".to_string()]);
    }

    #[tokio::test]
    async fn test_snapshot_writes_once() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = RecipientRepository::new(db.pool());

        repo.register("chat-1").await.unwrap();

        assert!(repo.snapshot().await.unwrap());
        // Second snapshot performs no write
        assert!(!repo.snapshot().await.unwrap());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipient_snapshots")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_track_later_registrations() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = RecipientRepository::new(db.pool());

        repo.register("chat-1").await.unwrap();
        repo.snapshot().await.unwrap();

        repo.register("chat-2").await.unwrap();
        repo.snapshot().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipient_snapshots")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = RecipientRepository::new(db.pool());

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.all().await.unwrap().is_empty());
    }
}
