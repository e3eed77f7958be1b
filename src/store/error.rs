//! Record store error types
//!
//! Defines all errors that can occur while reading or writing records.

use thiserror::Error;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite query or connection failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),

    /// Invalid date range (start >= end)
    #[error("Invalid date range: start must be less than end")]
    InvalidRange,

    /// Row holds a value outside the expected domain
    #[error("Corrupt record: {0}")]
    Corruption(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidRange;
        assert_eq!(
            err.to_string(),
            "Invalid date range: start must be less than end"
        );

        let err = StoreError::Task("cancelled".to_string());
        assert_eq!(err.to_string(), "Task error: cancelled");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }
}
