//! Harvest outcome definitions
//!
//! Every way a harvest can finish normally is a `StopReason`. Fatal
//! conditions (failed fetch, unreadable posting date, storage failure) are
//! returned as errors instead, so callers can tell "stopped, resume next run"
//! apart from "broken".
use std::fmt;

/// Why a harvest stopped walking the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Walked past the last page number discovered on page 0
    ReachedFinalPage,

    /// Met a posting no newer than the store's cut-off date
    IncrementalStop,

    /// Met a posting whose identifier is already stored
    DuplicateFound,
}

impl StopReason {
    /// Short label for reports and logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReachedFinalPage => "reached final page",
            Self::IncrementalStop => "reached previously harvested postings",
            Self::DuplicateFound => "found an already stored job",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary of one harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Why the walk ended
    pub stop: StopReason,

    /// Number of listing pages fetched
    pub pages_fetched: u32,

    /// Number of records appended to the store
    pub appended: usize,

    /// Last page number discovered on page 0
    pub total_pages: u32,

    /// Identifier of the posting that triggered the stop, if any
    pub stopped_at: Option<String>,
}

impl CrawlReport {
    /// Prints the report to stdout
    pub fn print(&self) {
        println!("=== Harvest Report ===\n");
        println!("  Stopped: {}", self.stop);
        if let Some(id) = &self.stopped_at {
            println!("  Stopped at job: {}", id);
        }
        println!(
            "  Pages fetched: {} (last page index {})",
            self.pages_fetched, self.total_pages
        );
        println!("  New jobs stored: {}", self.appended);
    }
}
