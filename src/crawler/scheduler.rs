//! Page scheduler for the listing walk
//!
//! This module handles:
//! - Tracking the current page index and the discovered page count
//! - Building the URL of each listing page
//! - Serialising requests with a randomised delay between them
//!
//! Only one request is ever in flight: the harvester awaits each page before
//! asking for the next one.

use crate::config::CrawlerConfig;
use crate::HarvestError;
use rand::Rng;
use std::time::{Duration, Instant};
use url::Url;

/// Scheduler walks listing pages in order and paces the requests
///
/// Page indices start at 0. The walk ends once the index exceeds the last
/// page number discovered on page 0.
#[derive(Debug)]
pub struct PageScheduler {
    /// Listing URL without the page parameter
    listing_url: Url,

    /// Index of the page to fetch next
    current_page: u32,

    /// Last page number from the pagination control, 0 until discovered
    total_pages: u32,

    /// Bounds of the randomised delay between requests
    min_delay: Duration,
    max_delay: Duration,

    /// When the previous request was started
    last_request: Option<Instant>,
}

impl PageScheduler {
    /// Creates a new scheduler positioned at page 0
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PageScheduler)` - Scheduler for the configured listing
    /// * `Err(HarvestError)` - The base URL or listing path is not a valid URL
    pub fn new(config: &CrawlerConfig) -> Result<Self, HarvestError> {
        let listing_url = Url::parse(&config.base_url)?.join(&config.listing_path)?;

        Ok(Self {
            listing_url,
            current_page: 0,
            total_pages: 0,
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms)),
            last_request: None,
        })
    }

    /// Index of the page to fetch next
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Last page number discovered so far
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Records the page count read from page 0's pagination control
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    /// URL of the page to fetch next
    pub fn page_url(&self) -> Url {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &self.current_page.to_string());
        url
    }

    /// Moves to the next page
    ///
    /// # Returns
    ///
    /// * `true` - There is another page to fetch
    /// * `false` - The index now exceeds the discovered page count
    pub fn advance(&mut self) -> bool {
        self.current_page += 1;
        self.current_page <= self.total_pages
    }

    /// Waits until the next request may start, then records it
    ///
    /// The first request goes out immediately. Every later request waits a
    /// uniformly random delay between the configured bounds, measured from
    /// the start of the previous request.
    pub async fn wait_turn(&mut self) {
        if let Some(last) = self.last_request {
            let delay = self.next_delay();
            let remaining = delay.saturating_sub(last.elapsed());
            if !remaining.is_zero() {
                tracing::debug!(
                    "Waiting {:?} before fetching page {}",
                    remaining,
                    self.current_page
                );
                tokio::time::sleep(remaining).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// Picks the next randomised delay
    fn next_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let millis = rand::thread_rng()
            .gen_range(self.min_delay.as_millis() as u64..=self.max_delay.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(min_delay_ms: u64, max_delay_ms: u64) -> CrawlerConfig {
        CrawlerConfig {
            base_url: "https://euraxess.example".to_string(),
            listing_path: "/jobs/search".to_string(),
            min_delay_ms,
            max_delay_ms,
            slack_days: 1,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn test_page_urls() {
        let mut scheduler = PageScheduler::new(&create_test_config(0, 0)).unwrap();
        assert_eq!(
            scheduler.page_url().as_str(),
            "https://euraxess.example/jobs/search?page=0"
        );

        scheduler.set_total_pages(3);
        assert!(scheduler.advance());
        assert_eq!(
            scheduler.page_url().as_str(),
            "https://euraxess.example/jobs/search?page=1"
        );
    }

    #[test]
    fn test_advance_stops_after_last_page() {
        let mut scheduler = PageScheduler::new(&create_test_config(0, 0)).unwrap();
        scheduler.set_total_pages(2);

        assert!(scheduler.advance()); // page 1
        assert!(scheduler.advance()); // page 2
        assert!(!scheduler.advance()); // page 3 > 2
        assert_eq!(scheduler.current_page(), 3);
    }

    #[test]
    fn test_no_pagination_means_single_page() {
        let mut scheduler = PageScheduler::new(&create_test_config(0, 0)).unwrap();
        assert_eq!(scheduler.total_pages(), 0);
        assert!(!scheduler.advance());
    }

    #[test]
    fn test_delay_within_bounds() {
        let scheduler = PageScheduler::new(&create_test_config(100, 200)).unwrap();
        for _ in 0..50 {
            let delay = scheduler.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }
    }

    #[tokio::test]
    async fn test_first_request_is_not_delayed() {
        let mut scheduler = PageScheduler::new(&create_test_config(5000, 5000)).unwrap();
        let start = Instant::now();
        scheduler.wait_turn().await;
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_later_requests_are_paced() {
        let mut scheduler = PageScheduler::new(&create_test_config(50, 50)).unwrap();
        scheduler.wait_turn().await;
        let start = Instant::now();
        scheduler.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
