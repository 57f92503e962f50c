use serde::Deserialize;

/// Main configuration structure for Euraxess-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root of the listing site (e.g., "https://euraxess.ec.europa.eu")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated search results, relative to the base URL
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Lower bound of the randomised delay between requests (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomised delay between requests (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Days subtracted from the newest stored posting date before comparing
    #[serde(rename = "slack-days", default = "default_slack_days")]
    pub slack_days: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV job store
    #[serde(rename = "store-path", default = "default_store_path")]
    pub store_path: String,

    /// Path to the favorites JSON file
    #[serde(rename = "favorites-path", default = "default_favorites_path")]
    pub favorites_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            favorites_path: default_favorites_path(),
        }
    }
}

fn default_listing_path() -> String {
    "/jobs/search".to_string()
}

// 5s, randomised between 0.5x and 1.5x
fn default_min_delay_ms() -> u64 {
    2500
}

fn default_max_delay_ms() -> u64 {
    7500
}

fn default_slack_days() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_store_path() -> String {
    "output/jobs.csv".to_string()
}

fn default_favorites_path() -> String {
    "favorites.json".to_string()
}
