//! Feed fetching for feedcast.
//!
//! The feed transport is a collaborator behind the [`FeedSource`] trait;
//! the production implementation fetches and parses RSS/Atom over HTTP
//! with bounded timeouts and a response size cap.

use std::future::Future;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;

use crate::error::{FeedcastError, Result};
use crate::feed::types::{FeedItem, MAX_FEED_SIZE, MAX_ITEMS_PER_FETCH};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = "feedcast/0.1 (feed ingester)";

/// Source of feed items.
pub trait FeedSource: Send + Sync {
    /// Fetch the current set of feed items.
    fn fetch(&self) -> impl Future<Output = Result<Vec<FeedItem>>> + Send;
}

/// HTTP feed fetcher.
pub struct HttpFeedFetcher {
    client: Client,
    url: String,
}

impl HttpFeedFetcher {
    /// Create a fetcher for the given feed URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedcastError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedcastError::Transport(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedcastError::Transport(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_FEED_SIZE {
                return Err(FeedcastError::Transport(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, MAX_FEED_SIZE
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedcastError::Transport(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > MAX_FEED_SIZE {
            return Err(FeedcastError::Transport(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                MAX_FEED_SIZE
            )));
        }

        Ok(bytes.to_vec())
    }
}

impl FeedSource for HttpFeedFetcher {
    fn fetch(&self) -> impl Future<Output = Result<Vec<FeedItem>>> + Send {
        async move {
            let bytes = self.fetch_bytes().await?;
            parse_feed(&bytes)
        }
    }
}

/// Parse raw feed bytes into items.
///
/// Only the title and summary survive; feed-assigned identifiers are
/// dropped because canonical content is the dedup key.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| FeedcastError::Transport(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .take(MAX_ITEMS_PER_FETCH)
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let body = entry.summary.map(|s| s.content).unwrap_or_default();
            FeedItem::new(title.trim(), body.trim())
        })
        .filter(|item| !item.title.is_empty() || !item.body.is_empty())
        .collect();

    Ok(items)
}

/// Validate a feed URL: http(s) scheme with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| FeedcastError::Transport(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FeedcastError::Transport(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(FeedcastError::Transport("URL has no host".to_string()));
    }

    Ok(())
}
