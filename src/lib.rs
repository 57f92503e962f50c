//! Euraxess-Harvest: an incremental job-listing harvester
//!
//! This crate walks the paginated research-jobs listing, appends newly seen
//! postings to a CSV store without duplicating identifiers, and provides the
//! filtering, favorites and reporting used by the command-line dashboard.

pub mod config;
pub mod crawler;
pub mod dashboard;
pub mod favorites;
pub mod record;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Euraxess-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: HTTP {status_code}")]
    FetchFailed { url: String, status_code: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unparseable posting date for job {id}: {source}")]
    DateParse {
        id: String,
        source: record::DateParseError,
    },

    #[error("Job {id} has no posting date")]
    MissingPostedOn { id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Euraxess-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{CareerStage, JobRecord};
pub use state::{CrawlReport, StopReason};
