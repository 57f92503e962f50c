use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Longest randomised pause allowed between two listing requests
const MAX_DELAY_CEILING_MS: u64 = 60_000;

const MAX_SLACK_DAYS: u32 = 30;

const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=300;

/// Checks every section of a parsed configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    check_crawler(&config.crawler)?;
    check_user_agent(&config.user_agent)?;
    check_output(&config.output)
}

/// Fails with a validation error unless `ok` holds
fn ensure(ok: bool, message: impl FnOnce() -> String) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation(message()))
    }
}

fn parse_url(field: &str, value: &str) -> ConfigResult<Url> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("{} '{}': {}", field, value, e)))
}

fn check_crawler(crawler: &CrawlerConfig) -> ConfigResult<()> {
    let base = parse_url("base-url", &crawler.base_url)?;
    ensure(matches!(base.scheme(), "http" | "https"), || {
        format!("base-url must be http or https, got '{}'", base.scheme())
    })?;

    ensure(crawler.listing_path.starts_with('/'), || {
        format!("listing-path must start with '/', got '{}'", crawler.listing_path)
    })?;

    ensure(crawler.min_delay_ms <= crawler.max_delay_ms, || {
        format!(
            "min-delay-ms ({}) is larger than max-delay-ms ({})",
            crawler.min_delay_ms, crawler.max_delay_ms
        )
    })?;
    ensure(crawler.max_delay_ms <= MAX_DELAY_CEILING_MS, || {
        format!(
            "max-delay-ms may be at most {}, got {}",
            MAX_DELAY_CEILING_MS, crawler.max_delay_ms
        )
    })?;

    ensure(crawler.slack_days <= MAX_SLACK_DAYS, || {
        format!(
            "slack-days may be at most {}, got {}",
            MAX_SLACK_DAYS, crawler.slack_days
        )
    })?;

    ensure(TIMEOUT_RANGE_SECS.contains(&crawler.request_timeout_secs), || {
        format!(
            "request-timeout-secs must be within {:?}, got {}",
            TIMEOUT_RANGE_SECS, crawler.request_timeout_secs
        )
    })
}

fn check_user_agent(agent: &UserAgentConfig) -> ConfigResult<()> {
    // Name goes into the User-Agent header verbatim
    let name = &agent.crawler_name;
    ensure(!name.is_empty(), || "crawler-name is empty".to_string())?;
    ensure(name.chars().all(|c| c.is_alphanumeric() || c == '-'), || {
        format!("crawler-name may only hold letters, digits and hyphens, got '{}'", name)
    })?;

    parse_url("contact-url", &agent.contact_url)?;
    check_email(&agent.contact_email)
}

fn check_output(output: &OutputConfig) -> ConfigResult<()> {
    ensure(!output.store_path.trim().is_empty(), || "store-path is empty".to_string())?;
    ensure(!output.favorites_path.trim().is_empty(), || {
        "favorites-path is empty".to_string()
    })?;
    ensure(output.store_path != output.favorites_path, || {
        format!(
            "store-path and favorites-path both point at '{}'",
            output.store_path
        )
    })
}

/// Rough shape check: `local@domain.tld` with exactly one `@`
fn check_email(email: &str) -> ConfigResult<()> {
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        })
        .unwrap_or(false);

    ensure(well_formed, || format!("contact-email '{}' is not an address", email))
}
