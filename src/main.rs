use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use feedcast::broadcast::{BroadcastEngine, EngineSettings, Scheduler};
use feedcast::{Config, Database, HttpFeedFetcher, WebhookSender};

#[tokio::main]
async fn main() -> feedcast::Result<()> {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    feedcast::logging::init(&config.logging)?;

    info!("feedcast starting");
    info!("feed: {}", config.feed.url);

    let db = Arc::new(Database::open(&config.store.path).await?);
    let source = HttpFeedFetcher::new(&config.feed.url)?;
    let sender = WebhookSender::new(&config.transport.webhook_url)?;

    let engine = Arc::new(BroadcastEngine::new(
        db,
        source,
        sender,
        EngineSettings::from_config(&config),
    ));

    let scheduler = Scheduler::start(
        engine,
        Duration::from_secs(config.feed.fetch_interval_secs),
        Duration::from_secs(config.broadcast.interval_secs),
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    scheduler.shutdown().await;
    info!("feedcast stopped");

    Ok(())
}
