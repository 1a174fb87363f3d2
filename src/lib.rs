//! feedcast - feed broadcast service.
//!
//! Periodically ingests items from an external feed, deduplicates them
//! against previously seen content, and fans out not-yet-seen items to
//! registered recipients, with at-most-once delivery per recipient inside
//! a bounded retention window.

pub mod broadcast;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod feed;
pub mod logging;
pub mod news;
pub mod recipient;
pub mod transport;

pub use broadcast::{BroadcastEngine, EngineSettings, Scheduler};
pub use config::Config;
pub use db::{Database, RetryPolicy};
pub use delivery::DeliveryRepository;
pub use error::{FeedcastError, Result};
pub use feed::{canonical_content, FeedItem, FeedSource, HttpFeedFetcher};
pub use news::{IngestService, NewsRepository};
pub use recipient::RecipientRepository;
pub use transport::{MessageSender, WebhookSender};
