//! Per-neighborhood summary statistics for run logging.
//!
//! Medians are computed over the records that survived extraction. A
//! neighborhood with no surviving records reports `None` instead of a median.

use crate::models::ListingRecord;
use crate::scrapers::SkipReason;
use itertools::Itertools;
use std::collections::BTreeMap;

/// What one neighborhood contributed to a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborhoodSummary {
    pub neighborhood: String,
    /// Listing rows found on the page.
    pub found: usize,
    /// Records that survived extraction.
    pub records: usize,
    /// Skipped rows, counted by reason.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Set when the page could not be fetched.
    pub fetch_error: Option<String>,
    pub median_price: Option<f64>,
    pub median_bedrooms: Option<f64>,
    pub median_sqft: Option<f64>,
}

impl NeighborhoodSummary {
    pub fn new(neighborhood: &str) -> Self {
        Self {
            neighborhood: neighborhood.to_string(),
            ..Default::default()
        }
    }

    /// Summary for a neighborhood whose page fetch failed.
    pub fn failed(neighborhood: &str, error: impl ToString) -> Self {
        Self {
            fetch_error: Some(error.to_string()),
            ..Self::new(neighborhood)
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Fill in record count and medians from the neighborhood's records.
    pub fn with_medians(mut self, records: &[ListingRecord]) -> Self {
        self.records = records.len();
        self.median_price = median(records.iter().map(|r| r.price));
        self.median_bedrooms = median(records.iter().map(|r| r.bedrooms));
        self.median_sqft = median(records.iter().map(|r| r.sqft));
        self
    }
}

/// Median of a set of values; the mean of the two middle values for even counts.
///
/// Returns `None` for an empty input.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let sorted = values
        .into_iter()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect::<Vec<_>>();

    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
