//! CSV job store implementation
//!
//! The store is a single CSV file with a fixed header, only ever appended
//! to. Rows are read leniently: a row whose posting date cannot be parsed
//! still contributes its identifier, so it can never be stored twice.

use crate::record::{
    format_deadline, format_posted_on, parse_deadline, parse_fuzzy_datetime, JobRecord,
};
use crate::state::{Baseline, KnownIds};
use crate::storage::traits::{AppendOutcome, RecordSink, StorageError, StorageResult};
use chrono::NaiveDateTime;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Column order of the job store
pub const STORE_COLUMNS: [&str; 14] = [
    "id",
    "type",
    "country",
    "university",
    "posted_on",
    "title",
    "link",
    "description",
    "department",
    "location",
    "field",
    "profile",
    "funding_program",
    "application_deadline",
];

/// Everything a reader learns from one pass over the store
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Every identifier in the store, including rows with unreadable dates
    pub known_ids: KnownIds,

    /// Newest readable `posted_on`
    pub newest_posted: Option<NaiveDateTime>,

    /// Rows that parsed into complete records, in file order
    pub records: Vec<JobRecord>,

    /// Rows with no identifier or an unreadable posting date
    pub malformed_rows: usize,
}

impl StoreSnapshot {
    /// Builds the harvest baseline from this snapshot
    pub fn into_baseline(self, slack_days: u32) -> Baseline {
        Baseline::new(self.known_ids, self.newest_posted, slack_days)
    }
}

/// CSV job store backend
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Creates a store handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the store file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the whole store
    ///
    /// A missing or blank store is an empty snapshot: the first harvest starts
    /// from nothing. A trailing row cut off by an interrupted append is ignored.
    pub fn snapshot(&self) -> StorageResult<StoreSnapshot> {
        if !self.exists() {
            tracing::info!(
                "No job store at {}, starting from an empty baseline",
                self.path.display()
            );
            return Ok(StoreSnapshot::default());
        }

        let bytes = std::fs::read(&self.path)?;
        let complete = complete_len(&bytes);
        if complete < bytes.len() {
            tracing::warn!(
                "{} ends with an incomplete row, ignoring it",
                self.path.display()
            );
        }

        let body = &bytes[..complete];
        if is_blank(body) {
            tracing::info!(
                "Job store {} is empty, starting from an empty baseline",
                self.path.display()
            );
            return Ok(StoreSnapshot::default());
        }

        let snapshot = read_snapshot(body)?;
        if snapshot.malformed_rows > 0 {
            tracing::warn!(
                "{} malformed rows in {}",
                snapshot.malformed_rows,
                self.path.display()
            );
        }
        Ok(snapshot)
    }

    /// Loads every complete record for display
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<JobRecord>)` - The stored records in file order
    /// * `Err(StorageError::NotFound)` - The store has not been created yet
    /// * `Err(StorageError::Schema)` - The header lacks a required column
    pub fn load_records(&self) -> StorageResult<Vec<JobRecord>> {
        if !self.exists() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }
        Ok(self.snapshot()?.records)
    }

    /// Opens the store for appending
    ///
    /// Parent directories are created as needed. A partial last row is
    /// truncated away. The header is written only when the file is new or
    /// blank; an existing header is not re-validated.
    ///
    /// # Arguments
    ///
    /// * `known_ids` - Identifiers the writer must refuse to append again
    pub fn open_writer(&self, known_ids: KnownIds) -> StorageResult<DedupWriter<File>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        // Anything after the last complete row is left over from an
        // interrupted append and is cut off before writing
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let mut keep = complete_len(&bytes);
        if is_blank(&bytes[..keep]) {
            keep = 0;
        }
        if keep < bytes.len() {
            tracing::warn!(
                "Discarding {} bytes after the last complete row of {}",
                bytes.len() - keep,
                self.path.display()
            );
            file.set_len(keep as u64)?;
        }
        let write_header = keep == 0;

        tracing::debug!(
            "Opened {} for append ({} known ids)",
            self.path.display(),
            known_ids.len()
        );
        DedupWriter::new(file, known_ids, write_header)
    }
}

/// Append writer that refuses identifiers it already knows
///
/// Each appended identifier joins the known set, so a posting that shows up
/// twice within one harvest is reported as a duplicate the second time.
pub struct DedupWriter<W: Write> {
    known_ids: KnownIds,
    writer: csv::Writer<W>,
}

impl<W: Write> DedupWriter<W> {
    /// Wraps a destination, optionally writing the header row first
    pub fn new(destination: W, known_ids: KnownIds, write_header: bool) -> StorageResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(destination);

        if write_header {
            writer.write_record(STORE_COLUMNS)?;
        }

        Ok(Self {
            known_ids,
            writer,
        })
    }

}

impl<W: Write> RecordSink for DedupWriter<W> {
    fn append(&mut self, record: &JobRecord) -> StorageResult<AppendOutcome> {
        if self.known_ids.contains(&record.id) {
            return Ok(AppendOutcome::Duplicate);
        }

        self.writer.write_record(record_to_row(record))?;
        self.known_ids.insert(record.id.clone());
        Ok(AppendOutcome::Appended)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Serializes a record in `STORE_COLUMNS` order
fn record_to_row(record: &JobRecord) -> [String; 14] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        record.id.clone(),
        text(&record.job_type),
        text(&record.country),
        text(&record.university),
        format_posted_on(&record.posted_on),
        text(&record.title),
        text(&record.link),
        text(&record.description),
        text(&record.department),
        text(&record.location),
        text(&record.field),
        text(&record.profile),
        text(&record.funding_program),
        record
            .application_deadline
            .as_ref()
            .map(format_deadline)
            .unwrap_or_default(),
    ]
}

/// Length of the prefix made of complete rows
///
/// A row is complete once its newline is seen outside a quoted field.
fn complete_len(bytes: &[u8]) -> usize {
    let mut in_quotes = false;
    let mut end = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => end = index + 1,
            _ => {}
        }
    }
    end
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Reads a store body into a snapshot
fn read_snapshot<R: Read>(source: R) -> StorageResult<StoreSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut columns = [0usize; 14];
    for (slot, name) in columns.iter_mut().zip(STORE_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| StorageError::Schema(format!("missing column '{}'", name)))?;
    }

    let mut snapshot = StoreSnapshot::default();

    for row in reader.records() {
        let row = row?;
        let cell = |column: usize| -> Option<String> {
            row.get(columns[column])
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let Some(id) = cell(0) else {
            snapshot.malformed_rows += 1;
            continue;
        };
        snapshot.known_ids.insert(id.clone());

        let posted_on = match cell(4).map(|raw| parse_fuzzy_datetime(&raw)) {
            Some(Ok(posted_on)) => posted_on,
            _ => {
                tracing::debug!("Row {} has no readable posted_on", id);
                snapshot.malformed_rows += 1;
                continue;
            }
        };

        if snapshot.newest_posted.map_or(true, |newest| posted_on > newest) {
            snapshot.newest_posted = Some(posted_on);
        }

        snapshot.records.push(JobRecord {
            id,
            job_type: cell(1),
            country: cell(2),
            university: cell(3),
            posted_on,
            title: cell(5),
            link: cell(6),
            description: cell(7),
            department: cell(8),
            location: cell(9),
            field: cell(10),
            profile: cell(11),
            funding_program: cell(12),
            application_deadline: cell(13).and_then(|raw| parse_deadline(&raw)),
        });
    }

    Ok(snapshot)
}
