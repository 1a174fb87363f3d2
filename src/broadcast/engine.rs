//! Broadcast engine for feedcast.
//!
//! Orchestrates the periodic ingest and broadcast cycles and the
//! on-demand single-recipient path. Store, feed source and outbound
//! sender are injected; the engine holds no global state.
//!
//! Selection uses the per-recipient policy: every recipient's candidate
//! pool is computed independently and one item is picked uniformly at
//! random from it, so recipients may receive different items in the same
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{Database, RetryPolicy};
use crate::delivery::DeliveryRepository;
use crate::feed::FeedSource;
use crate::news::{IngestService, NewsRepository};
use crate::recipient::RecipientRepository;
use crate::transport::MessageSender;
use crate::Result;

/// Engine tuning knobs, derived from the configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Retention window for ingested items, in seconds.
    pub dedup_ttl_secs: i64,
    /// Retention window for delivery records, in seconds.
    pub delivery_ttl_secs: i64,
    /// Grace period before the welcome delivery for a new recipient.
    pub welcome_grace: Duration,
}

impl EngineSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            dedup_ttl_secs: config.store.dedup_ttl_hours as i64 * 3600,
            delivery_ttl_secs: config.store.delivery_ttl_hours as i64 * 3600,
            welcome_grace: Duration::from_secs(config.broadcast.welcome_grace_secs),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The broadcast engine.
pub struct BroadcastEngine<F, S> {
    db: Arc<Database>,
    source: F,
    sender: S,
    settings: EngineSettings,
    retry: RetryPolicy,
}

impl<F, S> BroadcastEngine<F, S>
where
    F: FeedSource,
    S: MessageSender,
{
    /// Create an engine with the given collaborators.
    pub fn new(db: Arc<Database>, source: F, sender: S, settings: EngineSettings) -> Self {
        Self {
            db,
            source,
            sender,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the store retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one ingestion cycle: fetch, canonicalize, dedup-insert.
    ///
    /// Returns the number of newly added items. A fetch failure aborts the
    /// cycle with a recoverable error; items inserted by earlier cycles
    /// remain correctly recorded either way.
    pub async fn ingest(&self) -> Result<usize> {
        let items = self.source.fetch().await?;

        let service = IngestService::new(&self.db, self.settings.dedup_ttl_secs)
            .with_retry(self.retry);
        let added = service.ingest_batch(&items).await?;

        if added > 0 {
            let total = NewsRepository::with_retry(self.db.pool(), self.retry)
                .count()
                .await?;
            info!("ingested {} new item(s), {} in store", added, total);
        }
        Ok(added)
    }

    /// Run one broadcast cycle over all registered recipients.
    ///
    /// For each recipient: compute the candidate pool, pick one item at
    /// random, send it, record the delivery. A send failure for one
    /// recipient is logged and the cycle continues; the same item stays
    /// eligible for that recipient next cycle. Returns how many
    /// recipients received an item.
    pub async fn run_broadcast_cycle(&self) -> Result<usize> {
        let news = NewsRepository::with_retry(self.db.pool(), self.retry);
        let recipients = RecipientRepository::with_retry(self.db.pool(), self.retry);
        let deliveries = DeliveryRepository::with_retry(self.db.pool(), self.retry);

        if let Err(e) = deliveries.purge_expired().await {
            warn!("failed to purge expired deliveries: {}", e);
        }

        let items = news.all().await?;
        if items.is_empty() {
            debug!("no items in store, nothing to broadcast");
            return Ok(0);
        }

        let recipients = recipients.all().await?;
        let mut sent = 0;

        for recipient in &recipients {
            let candidates = match deliveries.available_for(recipient, &items).await {
                Ok(c) => c,
                Err(e) => {
                    warn!("candidate lookup failed for {}: {}", recipient, e);
                    continue;
                }
            };
            if candidates.is_empty() {
                debug!("nothing to send to {} this cycle", recipient);
                continue;
            }

            let pick = &candidates[rand::rng().random_range(0..candidates.len())];

            if let Err(e) = self.sender.send(recipient, pick).await {
                warn!("delivery to {} failed: {}", recipient, e);
                continue;
            }
            if let Err(e) = deliveries
                .mark_delivered(recipient, pick, self.settings.delivery_ttl_secs)
                .await
            {
                warn!("failed to record delivery to {}: {}", recipient, e);
            }
            sent += 1;
        }

        info!(
            "broadcast cycle delivered to {}/{} recipient(s)",
            sent,
            recipients.len()
        );
        Ok(sent)
    }

    /// On-demand single-recipient request.
    ///
    /// Returns the delivered item, or `None` when there is nothing to
    /// send - an empty store or an exhausted candidate pool, both normal
    /// outcomes the caller surfaces as "no news yet".
    pub async fn get_one_for(&self, recipient_id: &str) -> Result<Option<String>> {
        self.send_one_to(recipient_id).await
    }

    /// The shared single-recipient select+deliver path.
    async fn send_one_to(&self, recipient_id: &str) -> Result<Option<String>> {
        let news = NewsRepository::with_retry(self.db.pool(), self.retry);
        let deliveries = DeliveryRepository::with_retry(self.db.pool(), self.retry);

        let items = news.all().await?;
        if items.is_empty() {
            return Ok(None);
        }

        let candidates = deliveries.available_for(recipient_id, &items).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let pick = candidates[rand::rng().random_range(0..candidates.len())].clone();

        self.sender.send(recipient_id, &pick).await?;
        if let Err(e) = deliveries
            .mark_delivered(recipient_id, &pick, self.settings.delivery_ttl_secs)
            .await
        {
            // The message went out; a lost record only risks a repeat
            // after the next cycle, which the log makes visible.
            warn!("failed to record delivery to {}: {}", recipient_id, e);
        }
        Ok(Some(pick))
    }
}

impl<F, S> BroadcastEngine<F, S>
where
    F: FeedSource + 'static,
    S: MessageSender + 'static,
{
    /// Register a recipient. Returns whether it was already registered.
    ///
    /// A first-time registration snapshots the registry (errors logged,
    /// non-fatal) and schedules a welcome delivery after the configured
    /// grace period, independent of the periodic cycle.
    pub async fn register_recipient(self: &Arc<Self>, recipient_id: &str) -> Result<bool> {
        let repo = RecipientRepository::with_retry(self.db.pool(), self.retry);
        let already = repo.register(recipient_id).await?;
        if already {
            return Ok(true);
        }

        info!("registered new recipient {}", recipient_id);
        if let Err(e) = repo.snapshot().await {
            warn!("failed to snapshot recipient registry: {}", e);
        }
        self.schedule_welcome(recipient_id.to_string());
        Ok(false)
    }

    /// Schedule a delayed single-recipient delivery.
    pub fn schedule_welcome(self: &Arc<Self>, recipient_id: String) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(engine.settings.welcome_grace).await;
            match engine.send_one_to(&recipient_id).await {
                Ok(Some(_)) => debug!("welcome delivery sent to {}", recipient_id),
                Ok(None) => debug!("no items available for welcome to {}", recipient_id),
                Err(e) => warn!("welcome delivery to {} failed: {}", recipient_id, e),
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Mock collaborators shared by engine and scheduler tests.

    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::feed::{FeedItem, FeedSource};
    use crate::transport::MessageSender;
    use crate::{FeedcastError, Result};

    /// Feed source returning a fixed item list.
    #[derive(Clone, Default)]
    pub struct StubSource {
        pub items: Vec<FeedItem>,
        pub fail: bool,
        pub fetches: Arc<AtomicUsize>,
    }

    impl StubSource {
        pub fn with_items(items: Vec<FeedItem>) -> Self {
            Self {
                items,
                ..Self::default()
            }
        }
    }

    impl FeedSource for StubSource {
        fn fetch(&self) -> impl Future<Output = Result<Vec<FeedItem>>> + Send {
            let items = self.items.clone();
            let fail = self.fail;
            let fetches = Arc::clone(&self.fetches);
            async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(FeedcastError::Transport("feed down".into()))
                } else {
                    Ok(items)
                }
            }
        }
    }

    /// Sender that records every delivery.
    #[derive(Clone, Default)]
    pub struct RecordingSender {
        pub sent: Arc<Mutex<Vec<(String, String)>>>,
        pub fail: Arc<AtomicBool>,
    }

    impl RecordingSender {
        pub fn deliveries(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessageSender for RecordingSender {
        fn send(&self, recipient_id: &str, text: &str) -> impl Future<Output = Result<()>> + Send {
            let sent = Arc::clone(&self.sent);
            let fail = self.fail.load(Ordering::SeqCst);
            let recipient = recipient_id.to_string();
            let text = text.to_string();
            async move {
                if fail {
                    Err(FeedcastError::Transport("send failed".into()))
                } else {
                    sent.lock().unwrap().push((recipient, text));
                    Ok(())
                }
            }
        }
    }
}
