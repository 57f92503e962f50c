//! Crawler module for walking the job listing
//!
//! This module contains the harvesting logic, including:
//! - HTTP fetching with an identifying user agent
//! - Listing page parsing into raw entries
//! - Page sequencing and randomised politeness delays
//! - Overall harvest coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{plan_harvest, run_harvest, HarvestPlan, Harvester};
pub use fetcher::{build_http_client, fetch_page, user_agent_string, FetchResult};
pub use parser::{parse_listing_page, ListingPage, RawListing};
pub use scheduler::PageScheduler;
