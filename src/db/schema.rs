//! Database schema and migrations for feedcast.
//!
//! Migrations are applied sequentially when the database is opened; the
//! schema_version table tracks which ones have been applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - dedup store, recipient registry, delivery tracker
    r#"
-- Canonical fingerprints of every ingested item, with sliding retention.
-- expires_at is a unix timestamp; reads filter on it and cycles purge
-- expired rows, so an expired fingerprint behaves like a never-seen one.
CREATE TABLE news_items (
    fingerprint TEXT PRIMARY KEY,
    expires_at  INTEGER NOT NULL
);

CREATE INDEX idx_news_items_expires_at ON news_items(expires_at);

-- Registered recipients. Never removed by the core.
CREATE TABLE recipients (
    id          TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Durable one-shot copy of the registry.
CREATE TABLE recipient_snapshots (
    id           TEXT PRIMARY KEY,
    captured_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Per-recipient delivery records, presence-only, with their own TTL.
CREATE TABLE deliveries (
    recipient_id TEXT NOT NULL,
    fingerprint  TEXT NOT NULL,
    expires_at   INTEGER NOT NULL,
    PRIMARY KEY (recipient_id, fingerprint)
);

CREATE INDEX idx_deliveries_recipient ON deliveries(recipient_id);
CREATE INDEX idx_deliveries_expires_at ON deliveries(expires_at);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_core_tables() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE news_items"));
        assert!(first.contains("CREATE TABLE recipients"));
        assert!(first.contains("CREATE TABLE recipient_snapshots"));
        assert!(first.contains("CREATE TABLE deliveries"));
    }
}
