//! Dedup store module for feedcast.
//!
//! Durable set of fingerprints ever ingested, with TTL-based expiry, plus
//! the batch ingestion logic on top of it.

pub mod repository;
pub mod service;

pub use repository::NewsRepository;
pub use service::IngestService;
