//! Data models for neighborhoods, scraped listings and run results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NeighborhoodSource`]: A configured neighborhood and its search URL
//! - [`Listing`]: Fields extracted from a single listing row
//! - [`ListingRecord`]: A listing tagged with the neighborhood it was found in
//! - [`RunResult`]: Every record collected during a run, plus per-neighborhood summaries

use crate::stats::NeighborhoodSummary;
use serde::{Deserialize, Serialize};

/// A neighborhood to scrape and the search-results URL for it.
///
/// Built once per run from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NeighborhoodSource {
    /// Display name, copied onto every record scraped from this source.
    pub name: String,
    /// Search-results page to fetch.
    pub url: String,
}

impl NeighborhoodSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Fields extracted from one listing row, before it is tagged with a neighborhood.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// The `datetime` attribute of the row's `<time>` element, unmodified.
    pub posted_at: String,
    pub title: String,
    pub price: f64,
    pub bedrooms: f64,
    pub sqft: f64,
    /// The posting URL, absolute or relative as it appeared on the page.
    pub link: String,
}

impl Listing {
    /// Attach the neighborhood name, producing the record that is written to the sink.
    pub fn into_record(self, neighborhood: &str) -> ListingRecord {
        ListingRecord {
            neighborhood: neighborhood.to_string(),
            posted_at: self.posted_at,
            title: self.title,
            price: self.price,
            bedrooms: self.bedrooms,
            sqft: self.sqft,
            link: self.link,
        }
    }
}

/// A fully extracted listing, as serialized in the output dataset.
///
/// A record only exists when every field was derived from the page; partial
/// listings are dropped by the extractor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListingRecord {
    /// The neighborhood whose search page produced this listing.
    pub neighborhood: String,
    /// Posting timestamp, verbatim from the page (not parsed or reformatted).
    pub posted_at: String,
    /// The listing title.
    pub title: String,
    /// Monthly rent with the currency symbol stripped.
    pub price: f64,
    /// Bedroom count from the housing descriptor (e.g. `2br`).
    pub bedrooms: f64,
    /// Square footage from the housing descriptor (e.g. `950ft2`).
    pub sqft: f64,
    /// Link to the original posting.
    pub link: String,
}

/// The output of one complete run.
///
/// `records` are ordered by neighborhood (in configuration order) and then by
/// their position on the page. Only `records` is written to the sink; the
/// summaries exist for logging.
#[derive(Debug, Default)]
pub struct RunResult {
    pub records: Vec<ListingRecord>,
    pub summaries: Vec<NeighborhoodSummary>,
}

impl RunResult {
    /// Number of neighborhoods whose page could not be fetched.
    pub fn failed_neighborhoods(&self) -> usize {
        self.summaries
            .iter()
            .filter(|s| s.fetch_error.is_some())
            .count()
    }

    /// Total listings skipped by the extractor across all neighborhoods.
    pub fn skipped(&self) -> usize {
        self.summaries.iter().map(|s| s.skipped_total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Listing {
        Listing {
            posted_at: "2021-03-04 12:31".to_string(),
            title: "Sunny 2BR near the park".to_string(),
            price: 2150.0,
            bedrooms: 2.0,
            sqft: 950.0,
            link: "https://sandiego.craigslist.org/cen/apa/d/san-diego-sunny/7290000001.html"
                .to_string(),
        }
    }

    #[test]
    fn test_into_record_sets_neighborhood() {
        let record = sample_listing().into_record("Hillcrest");

        assert_eq!(record.neighborhood, "Hillcrest");
        assert_eq!(record.title, "Sunny 2BR near the park");
        assert_eq!(record.price, 2150.0);
    }

    #[test]
    fn test_record_json_round_trip() {
        let records = vec![
            sample_listing().into_record("Hillcrest"),
            Listing {
                posted_at: "2021-03-05T08:00:00-0800".to_string(),
                title: "  Studio w/ parking ".to_string(),
                price: 1395.5,
                bedrooms: 0.0,
                sqft: 410.0,
                link: "/apa/d/studio/7290000002.html".to_string(),
            }
            .into_record("North Park"),
        ];

        let json = serde_json::to_string(&records).unwrap();
        let parsed: Vec<ListingRecord> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, records);
        assert_eq!(parsed[1].posted_at, "2021-03-05T08:00:00-0800");
        assert_eq!(parsed[1].title, "  Studio w/ parking ");
    }

    #[test]
    fn test_record_json_has_all_fields() {
        let value = serde_json::to_value(sample_listing().into_record("Kensington")).unwrap();
        let object = value.as_object().unwrap();

        for field in [
            "neighborhood",
            "posted_at",
            "title",
            "price",
            "bedrooms",
            "sqft",
            "link",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert_eq!(object.len(), 7);
    }

    #[test]
    fn test_run_result_counts() {
        let mut ok = NeighborhoodSummary::new("Hillcrest");
        ok.record_skip(crate::scrapers::SkipReason::MissingHousingInfo);
        let mut failed = NeighborhoodSummary::new("North Park");
        failed.fetch_error = Some("HTTP 503".to_string());

        let result = RunResult {
            records: vec![],
            summaries: vec![ok, failed],
        };

        assert_eq!(result.failed_neighborhoods(), 1);
        assert_eq!(result.skipped(), 1);
    }
}
