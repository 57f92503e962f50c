//! HTTP boundary of the harvester
//!
//! Listing pages are fetched with a plain GET and an identifying user agent.
//! Requests are never retried: a failed page ends the harvest, and the next
//! run resumes from what the store already holds.

use crate::config::UserAgentConfig;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of fetching one listing page
#[derive(Debug)]
pub enum FetchResult {
    /// 2xx response with a readable body
    Page { body: String },

    /// The server answered, but not with a success status
    Status { status_code: u16 },

    /// No usable response: refused connection, timeout, broken body
    Network { error: String },
}

impl FetchResult {
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    /// Returns the page body, or the fatal error for this URL
    pub fn into_body(self, url: &Url) -> Result<String, HarvestError> {
        match self {
            Self::Page { body } => Ok(body),
            Self::Status { status_code } => Err(HarvestError::FetchFailed {
                url: url.to_string(),
                status_code,
            }),
            Self::Network { error } => Err(HarvestError::Network {
                url: url.to_string(),
                message: error,
            }),
        }
    }
}

/// `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(agent: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        agent.crawler_name, agent.crawler_version, agent.contact_url, agent.contact_email
    )
}

/// Builds the shared HTTP client
///
/// Compressed responses are decoded transparently. `timeout` bounds the
/// whole request, connecting is bounded separately.
///
/// # Example
///
/// ```no_run
/// use euraxess_harvest::config::UserAgentConfig;
/// use euraxess_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let agent = UserAgentConfig {
///     crawler_name: "EuraxessHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&agent, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(agent))
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one listing page
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            return FetchResult::Network {
                error: "request timed out".to_string(),
            }
        }
        Err(e) if e.is_connect() => {
            return FetchResult::Network {
                error: format!("connection failed: {}", e),
            }
        }
        Err(e) => {
            return FetchResult::Network {
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::Status {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => {
            tracing::trace!("{} answered {} with {} bytes", url, status, body.len());
            FetchResult::Page { body }
        }
        Err(e) => FetchResult::Network {
            error: format!("unreadable body: {}", e),
        },
    }
}
