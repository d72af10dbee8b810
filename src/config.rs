//! Run configuration: which neighborhoods to scrape and how.
//!
//! A [`ScrapeConfig`] is built once at startup, either from a YAML file or
//! from the built-in San Diego defaults, and passed explicitly to the
//! pipeline.
//!
//! ```yaml
//! search_url: https://sandiego.craigslist.org/search/apa
//! concurrency: 4
//! fetch_timeout_secs: 30
//! output_prefix: craigslist-rental-data
//! neighborhoods:
//!   - name: Hillcrest
//!   - name: North Park
//!   - name: Ocean Beach
//!     url: https://sandiego.craigslist.org/search/apa?query=ocean+beach
//! ```
//!
//! Neighborhoods without an explicit `url` get one built from `search_url`
//! (see [`search_url_for`]). Names are not required to be unique.

use crate::models::NeighborhoodSource;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://sandiego.craigslist.org/search/apa";
pub const DEFAULT_OUTPUT_PREFIX: &str = "craigslist-rental-data";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("rental_scraper/", env!("CARGO_PKG_VERSION"));

const SAN_DIEGO_NEIGHBORHOODS: [&str; 11] = [
    "Hillcrest",
    "North Park",
    "South Park",
    "Mission Hills",
    "Golden Hill",
    "Little Italy",
    "East Village",
    "Normal Heights",
    "University Heights",
    "Kensington",
    "Bankers Hill",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid search URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// A neighborhood entry as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct NeighborhoodEntry {
    pub name: String,
    /// Explicit search URL; built from the search URL template when absent.
    #[serde(default)]
    pub url: Option<String>,
}

/// Settings for one scrape run.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Base search URL used for neighborhoods without an explicit `url`.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Neighborhoods in the order they are scraped and written.
    pub neighborhoods: Vec<NeighborhoodEntry>,

    /// Maximum number of pages fetched at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory-like prefix of the output key.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}

impl Default for ScrapeConfig {
    /// The San Diego central neighborhoods.
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            neighborhoods: SAN_DIEGO_NEIGHBORHOODS
                .iter()
                .map(|name| NeighborhoodEntry {
                    name: name.to_string(),
                    url: None,
                })
                .collect(),
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            output_prefix: default_output_prefix(),
        }
    }
}

impl ScrapeConfig {
    /// Load a config from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        info!(
            neighborhoods = config.neighborhoods.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Per-fetch timeout, never shorter than one second.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Resolve every neighborhood to a `{name, url}` pair, preserving order
    /// and duplicates.
    pub fn sources(&self) -> Result<Vec<NeighborhoodSource>, ConfigError> {
        self.neighborhoods
            .iter()
            .map(|entry| {
                let url = match &entry.url {
                    Some(url) => url.clone(),
                    None => search_url_for(&self.search_url, &entry.name)?,
                };
                Ok(NeighborhoodSource::new(entry.name.clone(), url))
            })
            .collect()
    }
}

/// Build the apartment search URL for a neighborhood name.
///
/// `("https://sandiego.craigslist.org/search/apa", "North Park")` becomes
/// `https://sandiego.craigslist.org/search/apa?query=north+park&availabilityMode=0&sale_date=all+dates`.
pub fn search_url_for(search_url: &str, neighborhood: &str) -> Result<String, ConfigError> {
    let mut url = Url::parse(search_url).map_err(|source| ConfigError::InvalidUrl {
        url: search_url.to_string(),
        source,
    })?;
    url.query_pairs_mut()
        .append_pair("query", &neighborhood.to_lowercase())
        .append_pair("availabilityMode", "0")
        .append_pair("sale_date", "all dates");
    Ok(url.to_string())
}
