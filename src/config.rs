//! Configuration module for feedcast.

use serde::Deserialize;
use std::path::Path;

use crate::{FeedcastError, Result};

/// Feed ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL of the RSS/Atom feed to ingest.
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Ingestion interval in seconds.
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_secs: u64,
}

fn default_feed_url() -> String {
    "https://news.mail.ru/rss/".to_string()
}

fn default_fetch_interval() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            fetch_interval_secs: default_fetch_interval(),
        }
    }
}

/// Broadcast configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Broadcast cycle interval in seconds.
    #[serde(default = "default_broadcast_interval")]
    pub interval_secs: u64,
    /// Grace period before the welcome delivery after a new registration,
    /// in seconds.
    #[serde(default = "default_welcome_grace")]
    pub welcome_grace_secs: u64,
}

fn default_broadcast_interval() -> u64 {
    // 45 minutes
    2700
}

fn default_welcome_grace() -> u64 {
    5
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_broadcast_interval(),
            welcome_grace_secs: default_welcome_grace(),
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Retention window for ingested items, in hours.
    #[serde(default = "default_dedup_ttl")]
    pub dedup_ttl_hours: u64,
    /// Retention window for per-recipient delivery records, in hours.
    /// Independent of the dedup window; the two may diverge.
    #[serde(default = "default_delivery_ttl")]
    pub delivery_ttl_hours: u64,
}

fn default_db_path() -> String {
    "data/feedcast.db".to_string()
}

fn default_dedup_ttl() -> u64 {
    48
}

fn default_delivery_ttl() -> u64 {
    96
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            dedup_ttl_hours: default_dedup_ttl(),
            delivery_ttl_hours: default_delivery_ttl(),
        }
    }
}

/// Outbound transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Webhook endpoint that receives outbound messages as JSON.
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
}

fn default_webhook_url() -> String {
    "http://127.0.0.1:8081/send".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. When unset, logs go to the console only.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Feed ingestion settings.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    /// Backing store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Outbound transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a toml file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FeedcastError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.fetch_interval_secs, 60);
        assert_eq!(config.broadcast.interval_secs, 2700);
        assert_eq!(config.broadcast.welcome_grace_secs, 5);
        assert_eq!(config.store.dedup_ttl_hours, 48);
        assert_eq!(config.store.delivery_ttl_hours, 96);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            [feed]
            url = "https://example.com/rss"

            [store]
            delivery_ttl_hours = 48
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed.url, "https://example.com/rss");
        // Untouched fields fall back to defaults
        assert_eq!(config.feed.fetch_interval_secs, 60);
        assert_eq!(config.store.dedup_ttl_hours, 48);
        assert_eq!(config.store.delivery_ttl_hours, 48);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store.path, "data/feedcast.db");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("does/not/exist.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[broadcast]\ninterval_secs = 60").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.broadcast.interval_secs, 60);
    }
}
