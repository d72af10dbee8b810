//! Per-neighborhood scraping and aggregation across all neighborhoods.
//!
//! # Pipeline
//!
//! 1. **Fetch**: download the neighborhood's search page (bounded by a timeout)
//! 2. **Extract**: locate listing rows and extract each one, dropping skips
//! 3. **Tag**: stamp every surviving listing with the neighborhood name
//! 4. **Merge**: concatenate contributions in configuration order
//!
//! Up to `concurrency` neighborhoods are fetched at once. Contributions are
//! merged whole and in source order regardless of completion order, and a
//! neighborhood whose fetch fails contributes no records without affecting
//! the others.

use crate::fetch::{Fetch, FetchError};
use crate::models::{ListingRecord, NeighborhoodSource, RunResult};
use crate::scrapers::craigslist;
use crate::stats::NeighborhoodSummary;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Records scraped from one neighborhood, with its summary.
#[derive(Debug)]
pub struct NeighborhoodScrape {
    pub records: Vec<ListingRecord>,
    pub summary: NeighborhoodSummary,
}

/// Fetch one neighborhood's search page and extract its listings.
///
/// Every returned record carries `source.name` as its neighborhood. Fails
/// only when the page cannot be fetched within `timeout`.
#[instrument(level = "info", skip_all, fields(neighborhood = %source.name))]
pub async fn scrape_neighborhood<F: Fetch>(
    fetcher: &F,
    source: &NeighborhoodSource,
    timeout: Duration,
) -> Result<NeighborhoodScrape, FetchError> {
    let html = tokio::time::timeout(timeout, fetcher.fetch(&source.url))
        .await
        .map_err(|_| FetchError::Timeout {
            url: source.url.clone(),
            timeout,
        })??;

    let page = craigslist::extract_page(&html);

    let records = page
        .listings
        .into_iter()
        .map(|listing| listing.into_record(&source.name))
        .collect::<Vec<_>>();

    let mut summary = NeighborhoodSummary::new(&source.name).with_medians(&records);
    summary.found = page.found;
    for reason in page.skipped {
        summary.record_skip(reason);
    }

    log_summary(&summary);
    Ok(NeighborhoodScrape { records, summary })
}

/// Scrape every neighborhood and merge the results in source order.
///
/// Never fails: a neighborhood whose fetch fails is logged, recorded in its
/// summary and contributes no records.
#[instrument(level = "info", skip_all, fields(neighborhoods = sources.len(), concurrency = concurrency))]
pub async fn aggregate<F: Fetch>(
    fetcher: &F,
    sources: &[NeighborhoodSource],
    concurrency: usize,
    timeout: Duration,
) -> RunResult {
    let contributions: Vec<NeighborhoodScrape> = stream::iter(sources)
        .map(|source| async move {
            match scrape_neighborhood(fetcher, source, timeout).await {
                Ok(scrape) => scrape,
                Err(e) => {
                    error!(
                        neighborhood = %source.name,
                        url = %source.url,
                        error = %e,
                        "Fetch failed; neighborhood contributes no listings"
                    );
                    NeighborhoodScrape {
                        records: Vec::new(),
                        summary: NeighborhoodSummary::failed(&source.name, e),
                    }
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut result = RunResult::default();
    for contribution in contributions {
        result.records.extend(contribution.records);
        result.summaries.push(contribution.summary);
    }

    info!(
        records = result.records.len(),
        skipped = result.skipped(),
        failed_neighborhoods = result.failed_neighborhoods(),
        "Aggregated all neighborhoods"
    );
    result
}

fn log_summary(summary: &NeighborhoodSummary) {
    info!(
        neighborhood = %summary.neighborhood,
        found = summary.found,
        records = summary.records,
        skipped = summary.skipped_total(),
        median_price = ?summary.median_price,
        median_bedrooms = ?summary.median_bedrooms,
        median_sqft = ?summary.median_sqft,
        "Scraped neighborhood"
    );
}
