//! Page fetching for search-results URLs.
//!
//! The pipeline only needs "give me the markup at this URL", so fetching sits
//! behind the [`Fetch`] trait. [`HttpFetcher`] is the real implementation;
//! tests substitute in-memory fetchers.

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Why a page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no response from {url} within {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },
}

/// Trait for retrieving page markup.
///
/// Implementors return the response body as text, or a [`FetchError`] when the
/// request fails or the server answers with a non-success status.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher that identifies itself with `user_agent` and gives up on
    /// a request after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Non-success response");
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "https://sandiego.craigslist.org/search/apa".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 503 Service Unavailable for https://sandiego.craigslist.org/search/apa"
        );
    }

    #[test]
    fn test_timeout_error_message() {
        let err = FetchError::Timeout {
            url: "https://example.org".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "no response from https://example.org within 30s");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new("rental_scraper/0.1", Duration::from_secs(5)).is_ok());
    }
}
