//! Error types for feedcast.

use thiserror::Error;

/// Common error type for feedcast.
///
/// Every failure in the core is cycle-scoped: a `Store` error aborts the
/// current cycle, a `Transport` error skips the affected unit of work, and
/// the next timer tick starts fresh. Nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum FeedcastError {
    /// Backing store unreachable after the retry budget was exhausted.
    #[error("store unavailable: {0}")]
    Store(String),

    /// Feed fetch/parse or outbound send failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for FeedcastError {
    fn from(e: sqlx::Error) -> Self {
        FeedcastError::Store(e.to_string())
    }
}

/// Result type alias for feedcast operations.
pub type Result<T> = std::result::Result<T, FeedcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = FeedcastError::Store("connection refused".to_string());
        assert_eq!(err.to_string(), "store unavailable: connection refused");
    }

    #[test]
    fn test_transport_error_display() {
        let err = FeedcastError::Transport("timeout".to_string());
        assert_eq!(err.to_string(), "transport error: timeout");
    }

    #[test]
    fn test_config_error_display() {
        let err = FeedcastError::Config("missing feed url".to_string());
        assert_eq!(err.to_string(), "configuration error: missing feed url");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FeedcastError = io_err.into();
        assert!(matches!(err, FeedcastError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: FeedcastError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, FeedcastError::Store(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(sample_ok().unwrap(), 42);
    }
}
