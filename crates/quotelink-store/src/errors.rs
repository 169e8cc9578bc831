//! Error handling for quotelink-store
//!
//! Wraps quotelink-core ExError with store-specific helpers

use quotelink_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a (de)serialization error for the persisted document
pub fn serialization_error(operation: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error for a store whose internal state is unusable
pub fn persistence_error(operation: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}

/// Create the error returned when compare-and-set retries run out
pub fn conflict_exhausted(target_id: &str, attempts: u32) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op("compare_and_write")
        .with_record_id(target_id)
        .with_message(format!(
            "Ledger changed concurrently on each of {} attempts",
            attempts
        ))
}
