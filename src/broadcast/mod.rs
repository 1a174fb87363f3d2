//! Broadcast engine module for feedcast.
//!
//! The cycle orchestration (ingest, select, deliver) and the periodic
//! scheduler driving it.

pub mod engine;
pub mod scheduler;

pub use engine::{BroadcastEngine, EngineSettings};
pub use scheduler::Scheduler;
