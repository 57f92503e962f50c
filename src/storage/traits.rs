//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::record::JobRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Job store not found: {0}")]
    NotFound(String),

    #[error("Malformed job store: {0}")]
    Schema(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What happened to a record handed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was new and has been written
    Appended,

    /// The record's identifier is already stored; nothing was written
    Duplicate,
}

/// Trait for append-only record destinations
///
/// Implementations decide membership against the identifiers they were
/// given, so a harvest can be run against any sink in tests.
pub trait RecordSink {
    /// Appends a record unless its identifier is already known
    ///
    /// # Returns
    ///
    /// * `Ok(AppendOutcome::Appended)` - The record was written
    /// * `Ok(AppendOutcome::Duplicate)` - The identifier is known, nothing written
    /// * `Err(StorageError)` - The write failed
    fn append(&mut self, record: &JobRecord) -> StorageResult<AppendOutcome>;

    /// Flushes buffered rows to the underlying destination
    fn flush(&mut self) -> StorageResult<()>;
}
