//! Ingestion service for feedcast.
//!
//! Runs a dedup batch over fetched feed items: canonicalize, check, insert.

use tracing::{debug, warn};

use crate::db::{Database, RetryPolicy};
use crate::feed::FeedItem;
use crate::news::repository::NewsRepository;
use crate::Result;

/// Service for ingesting feed items into the dedup store.
pub struct IngestService<'a> {
    db: &'a Database,
    dedup_ttl_secs: i64,
    retry: RetryPolicy,
}

impl<'a> IngestService<'a> {
    /// Create an ingest service with the given retention window.
    pub fn new(db: &'a Database, dedup_ttl_secs: i64) -> Self {
        Self {
            db,
            dedup_ttl_secs,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the store retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Ingest a batch of items, returning how many were newly added.
    ///
    /// Each item is canonicalized and checked for membership before
    /// insertion, so an item already present from a prior cycle is never
    /// double-counted. A store error on an individual item is logged and
    /// that item skipped; one bad item never aborts the batch.
    pub async fn ingest_batch(&self, items: &[FeedItem]) -> Result<usize> {
        let repo = NewsRepository::with_retry(self.db.pool(), self.retry);

        // Expired rows behave as absent either way; purging keeps the
        // table from accumulating dead entries.
        if let Err(e) = repo.purge_expired().await {
            warn!("failed to purge expired items: {}", e);
        }

        let mut added = 0;
        for item in items {
            let fingerprint = item.canonical_content();
            if fingerprint.is_empty() {
                continue;
            }

            match repo.exists(&fingerprint).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!("membership check failed, skipping item: {}", e);
                    continue;
                }
            }

            match repo.insert(&fingerprint, self.dedup_ttl_secs).await {
                Ok(()) => added += 1,
                Err(e) => {
                    warn!("failed to store item, skipping: {}", e);
                }
            }
        }

        if added > 0 {
            debug!("ingest batch added {} item(s)", added);
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    const HOUR: i64 = 3600;

    fn items(pairs: &[(&str, &str)]) -> Vec<FeedItem> {
        pairs
            .iter()
            .map(|(t, b)| FeedItem::new(*t, *b))
            .collect()
    }

    #[tokio::test]
    async fn test_ingest_counts_new_items() {
        let db = Database::open_in_memory().await.unwrap();
        let service = IngestService::new(&db, HOUR);

        let batch = items(&[
            ("Storm hits city", "Flooding reported"),
            ("Quiet day!", "Nothing happened"),
        ]);
        let added = service.ingest_batch(&batch).await.unwrap();
        assert_eq!(added, 2);
    }

    #[tokio::test]
    async fn test_ingest_same_item_twice_adds_once() {
        let db = Database::open_in_memory().await.unwrap();
        let service = IngestService::new(&db, HOUR);

        let batch = items(&[("Storm hits city", "Flooding reported")]);
        let first = service.ingest_batch(&batch).await.unwrap();
        let second = service.ingest_batch(&batch).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);

        let repo = NewsRepository::new(db.pool());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ingest_dedups_within_batch() {
        let db = Database::open_in_memory().await.unwrap();
        let service = IngestService::new(&db, HOUR);

        // Same canonical content appearing twice in one fetch
        let batch = items(&[
            ("Storm hits city", "Flooding reported"),
            ("Storm hits city", "Flooding reported"),
        ]);
        let added = service.ingest_batch(&batch).await.unwrap();
        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_ingest_skips_empty_items() {
        let db = Database::open_in_memory().await.unwrap();
        let service = IngestService::new(&db, HOUR);

        let batch = items(&[("", ""), ("Real item", "With a body")]);
        let added = service.ingest_batch(&batch).await.unwrap();
        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_ingest_empty_batch() {
        let db = Database::open_in_memory().await.unwrap();
        let service = IngestService::new(&db, HOUR);

        let added = service.ingest_batch(&[]).await.unwrap();
        assert_eq!(added, 0);
    }
}
