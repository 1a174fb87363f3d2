//! Periodic task scheduling for feedcast.
//!
//! Two independent timers drive the system: an ingestion timer and a
//! broadcast timer. Both tasks are started once at process init and
//! stopped together through a shared shutdown signal; a failed cycle
//! only logs and waits for the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::broadcast::engine::BroadcastEngine;
use crate::feed::FeedSource;
use crate::transport::MessageSender;

/// Handle over the running periodic tasks.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Start the ingest and broadcast tasks.
    pub fn start<F, S>(
        engine: Arc<BroadcastEngine<F, S>>,
        ingest_every: Duration,
        broadcast_every: Duration,
    ) -> Self
    where
        F: FeedSource + 'static,
        S: MessageSender + 'static,
    {
        let (shutdown, rx) = watch::channel(false);

        let ingest = tokio::spawn(run_ingest_loop(
            Arc::clone(&engine),
            ingest_every,
            rx.clone(),
        ));
        let broadcast = tokio::spawn(run_broadcast_loop(engine, broadcast_every, rx));

        Self {
            shutdown,
            handles: vec![ingest, broadcast],
        }
    }

    /// Signal both tasks to stop and wait for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn run_ingest_loop<F, S>(
    engine: Arc<BroadcastEngine<F, S>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    F: FeedSource,
    S: MessageSender,
{
    info!("ingest task started (interval: {:?})", every);
    let mut timer = interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                if let Err(e) = engine.ingest().await {
                    warn!("ingest cycle failed: {}", e);
                }
            }
            _ = shutdown.changed() => {
                info!("ingest task stopping");
                break;
            }
        }
    }
}

async fn run_broadcast_loop<F, S>(
    engine: Arc<BroadcastEngine<F, S>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    F: FeedSource,
    S: MessageSender,
{
    info!("broadcast task started (interval: {:?})", every);
    let mut timer = interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                if let Err(e) = engine.run_broadcast_cycle().await {
                    warn!("broadcast cycle failed: {}", e);
                }
            }
            _ = shutdown.changed() => {
                info!("broadcast task stopping");
                break;
            }
        }
    }
}
