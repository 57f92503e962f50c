//! Storage module for persisting harvested jobs
//!
//! This module handles the CSV job store, including:
//! - The fixed column schema
//! - Reading the store into a snapshot (identifiers, newest date, records)
//! - The deduplicating append writer used by the harvester

mod csv_store;
mod traits;

pub use csv_store::{CsvStore, DedupWriter, StoreSnapshot, STORE_COLUMNS};
pub use traits::{AppendOutcome, RecordSink, StorageError, StorageResult};
