//! State module for tracking harvest progress
//!
//! This module provides the state a harvest starts from and ends with.
//!
//! # Components
//!
//! - `KnownIds`: identifiers already in the store, injected into the writer
//! - `Baseline`: known identifiers plus the newest stored posting date
//! - `StopReason` / `CrawlReport`: how and where a harvest ended

mod baseline;
mod run_state;

// Re-export main types
pub use baseline::{Baseline, KnownIds};
pub use run_state::{CrawlReport, StopReason};
