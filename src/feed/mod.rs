//! Feed module for feedcast.
//!
//! Feed item model, canonicalization, and the fetch collaborator.

pub mod fetcher;
pub mod types;

pub use fetcher::{parse_feed, validate_url, FeedSource, HttpFeedFetcher};
pub use types::{canonical_content, FeedItem, MAX_FEED_SIZE, MAX_ITEMS_PER_FETCH};
