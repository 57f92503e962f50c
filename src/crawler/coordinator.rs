//! Harvest coordinator - main listing walk
//!
//! This module contains the loop that coordinates one harvest:
//! - Fetching listing pages in order, one at a time
//! - Discovering the page count from the first page
//! - Converting entries to records and applying the incremental stop
//! - Handing new records to the deduplicating sink
//!
//! The walk assumes entries are listed newest first within a page. The first
//! stale or duplicate entry ends the harvest; nothing after it is stored.

use crate::config::Config;
use crate::crawler::parser::parse_listing_page;
use crate::crawler::scheduler::PageScheduler;
use crate::crawler::{build_http_client, fetch_page};
use crate::state::{Baseline, CrawlReport, StopReason};
use crate::storage::{AppendOutcome, CsvStore, RecordSink};
use crate::HarvestError;
use chrono::NaiveDateTime;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Main harvest coordinator structure
pub struct Harvester<S: RecordSink> {
    client: Client,
    scheduler: PageScheduler,
    baseline: Baseline,
    sink: S,
    pages_fetched: u32,
    appended: usize,
}

impl<S: RecordSink> Harvester<S> {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `baseline` - Cut-off date and known identifiers from the store
    /// * `sink` - Destination for new records
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - Invalid listing URL or HTTP client failure
    pub fn new(config: &Config, baseline: Baseline, sink: S) -> Result<Self, HarvestError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let scheduler = PageScheduler::new(&config.crawler)?;

        Ok(Self {
            client,
            scheduler,
            baseline,
            sink,
            pages_fetched: 0,
            appended: 0,
        })
    }

    /// Runs the listing walk until a stop condition or a fatal error
    ///
    /// The sink is flushed on every exit path, so records appended before a
    /// failure stay in the store.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let start_time = Instant::now();
        match self.baseline.last_known_newest() {
            Some(cutoff) => tracing::info!("Harvesting jobs posted after {}", cutoff),
            None => tracing::info!("No previous jobs, harvesting the full listing"),
        }

        let walked = self.walk().await;
        let flushed = self.sink.flush();

        let (stop, stopped_at) = walked?;
        flushed?;

        let report = CrawlReport {
            stop,
            pages_fetched: self.pages_fetched,
            appended: self.appended,
            total_pages: self.scheduler.total_pages(),
            stopped_at,
        };

        tracing::info!(
            "Harvest finished ({}): {} new jobs from {} pages in {:?}",
            report.stop,
            report.appended,
            report.pages_fetched,
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Consumes the harvester and returns its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    async fn walk(&mut self) -> Result<(StopReason, Option<String>), HarvestError> {
        loop {
            let page_index = self.scheduler.current_page();
            let url = self.scheduler.page_url();

            self.scheduler.wait_turn().await;
            tracing::debug!("Fetching page {}: {}", page_index, url);

            let body = fetch_page(&self.client, &url)
                .await
                .into_body(&url)
                .map_err(|e| {
                    tracing::error!("Page {} failed: {}", page_index, e);
                    e
                })?;
            self.pages_fetched += 1;

            let page = parse_listing_page(&body, &url);

            if page_index == 0 {
                let total_pages = page.total_pages.unwrap_or_else(|| {
                    tracing::warn!("No page count on the first page, treating it as the last");
                    0
                });
                tracing::info!("Listing reports {} as its last page", total_pages);
                self.scheduler.set_total_pages(total_pages);
            }

            tracing::info!(
                "Page {}: {} jobs listed",
                page_index,
                page.entries.len()
            );

            for entry in page.entries {
                let record = entry.into_record()?;

                if self.baseline.is_stale(record.posted_on) {
                    tracing::info!(
                        "Job {} posted on {} is not newer than the last harvest, stopping",
                        record.id,
                        record.posted_on.date()
                    );
                    return Ok((StopReason::IncrementalStop, Some(record.id)));
                }

                match self.sink.append(&record)? {
                    AppendOutcome::Appended => {
                        self.appended += 1;
                        tracing::debug!("Stored job {}", record.id);
                    }
                    AppendOutcome::Duplicate => {
                        tracing::info!("Job {} already exists, stopping", record.id);
                        return Ok((StopReason::DuplicateFound, Some(record.id)));
                    }
                }
            }

            if !self.scheduler.advance() {
                tracing::info!(
                    "Reached the final page: {}",
                    self.scheduler.current_page()
                );
                return Ok((StopReason::ReachedFinalPage, None));
            }
        }
    }
}

/// What a harvest would start from, without touching the network
#[derive(Debug, Clone)]
pub struct HarvestPlan {
    pub store_path: String,
    pub known_jobs: usize,
    pub newest_posted: Option<NaiveDateTime>,
    pub cutoff: Option<NaiveDateTime>,
    pub first_page_url: String,
    pub delay_ms: (u64, u64),
}

impl HarvestPlan {
    /// Prints the plan to stdout
    pub fn print(&self) {
        println!("=== Euraxess-Harvest Dry Run ===\n");
        println!("Store: {}", self.store_path);
        println!("  Known jobs: {}", self.known_jobs);
        match (self.newest_posted, self.cutoff) {
            (Some(newest), Some(cutoff)) => {
                println!("  Newest posting: {}", newest.date());
                println!("  Stops at postings on or before: {}", cutoff);
            }
            _ => println!("  Empty store: the full listing would be harvested"),
        }
        println!("\nFirst request: {}", self.first_page_url);
        println!(
            "Delay between requests: {}..{}ms",
            self.delay_ms.0, self.delay_ms.1
        );
    }
}

/// Builds the harvest plan from the store and configuration
pub fn plan_harvest(config: &Config) -> Result<HarvestPlan, HarvestError> {
    let store = CsvStore::new(&config.output.store_path);
    let baseline = store.snapshot()?.into_baseline(config.crawler.slack_days);
    let scheduler = PageScheduler::new(&config.crawler)?;

    Ok(HarvestPlan {
        store_path: config.output.store_path.clone(),
        known_jobs: baseline.known_ids.len(),
        newest_posted: baseline.newest_posted,
        cutoff: baseline.last_known_newest(),
        first_page_url: scheduler.page_url().to_string(),
        delay_ms: (config.crawler.min_delay_ms, config.crawler.max_delay_ms),
    })
}

/// Runs one harvest against the configured store
///
/// This function:
///
/// 1. Reads the store once to build the baseline (known ids, cut-off date)
/// 2. Opens the store for append with the known ids injected
/// 3. Walks the listing until a stop condition
///
/// # Example
///
/// ```no_run
/// use euraxess_harvest::config::load_config;
/// use euraxess_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(&config).await?;
/// println!("{} new jobs", report.appended);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config) -> Result<CrawlReport, HarvestError> {
    let store = CsvStore::new(&config.output.store_path);
    let snapshot = store.snapshot()?;
    tracing::info!(
        "Store {} holds {} jobs",
        config.output.store_path,
        snapshot.known_ids.len()
    );

    let baseline = snapshot.into_baseline(config.crawler.slack_days);
    let writer = store.open_writer(baseline.known_ids.clone())?;

    let mut harvester = Harvester::new(config, baseline, writer)?;
    harvester.run().await
}
