//! Dashboard module for browsing harvested jobs
//!
//! This module handles everything the dashboard does on top of the store:
//! - Loading records and dropping postings whose deadline has passed
//! - Deriving the field taxonomy split and career-stage flags per row
//! - Filter options, filtering and summary metrics
//! - Plain-text and markdown rendering of the job table

mod filter;
mod markdown;
mod options;
mod stats;
mod table;

pub use filter::{DeadlineWindow, JobFilter};
pub use markdown::{export_markdown, format_markdown_table};
pub use options::{narrow, FilterOptions};
pub use stats::DashboardStats;
pub use table::{paginate, render_table, Page, MAX_DISPLAY_ROWS};

use crate::record::{CareerStage, FieldSplit, JobRecord};
use crate::storage::{CsvStore, StorageError};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors surfaced to the dashboard user
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No job store at {0}. Run the crawl command first.")]
    MissingStore(String),

    #[error("The job store is malformed: {0}")]
    Malformed(String),

    #[error("Could not read the job store: {0}")]
    Storage(StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => Self::MissingStore(path),
            StorageError::Schema(message) => Self::Malformed(message),
            StorageError::Csv(e) => Self::Malformed(e.to_string()),
            other => Self::Storage(other),
        }
    }
}

/// A stored job enriched with its derived dashboard columns
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub record: JobRecord,
    pub fields: FieldSplit,
    pub stages: Vec<CareerStage>,
}

impl JobRow {
    pub fn from_record(record: JobRecord) -> Self {
        let fields = record.field_split();
        let stages = record.career_stages();
        Self {
            record,
            fields,
            stages,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn has_stage(&self, stage: CareerStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Loads the store for display
///
/// Rows whose application deadline is before `now` are dropped. Rows without
/// a deadline are kept.
///
/// # Returns
///
/// * `Ok(Vec<JobRow>)` - Open postings in store order
/// * `Err(DashboardError)` - The store is missing or unreadable
pub fn load_dashboard_data(
    store: &CsvStore,
    now: NaiveDateTime,
) -> Result<Vec<JobRow>, DashboardError> {
    let records = store.load_records()?;
    let total = records.len();

    let rows: Vec<JobRow> = records
        .into_iter()
        .filter(|record| !record.is_expired(now))
        .map(JobRow::from_record)
        .collect();

    tracing::debug!(
        "Loaded {} open jobs ({} expired) from {}",
        rows.len(),
        total - rows.len(),
        store.path().display()
    );

    Ok(rows)
}
