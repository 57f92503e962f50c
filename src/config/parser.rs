use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the harvester configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use euraxess_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Listing: {}{}", config.crawler.base_url, config.crawler.listing_path);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    tracing::debug!(
        "Parsed config: listing {}{}, store {}, favorites {}",
        config.crawler.base_url,
        config.crawler.listing_path,
        config.output.store_path,
        config.output.favorites_path
    );

    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration text
///
/// Logged at startup so the rows a harvest added can be tied back to the
/// settings it ran with.
pub fn compute_config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads the configuration together with the hash of the exact bytes read
///
/// The file is read once, so the hash always describes the configuration
/// that was actually parsed.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, compute_config_hash(&content)))
}
