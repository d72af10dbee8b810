//! Listing scrapers for classifieds search-results pages.
//!
//! Each scraper turns the raw HTML of one search-results page into listings
//! in two steps:
//!
//! 1. **Locating**: find every listing row on the page, in page order
//! 2. **Extracting**: derive the listing's fields from its row, or report
//!    why the row was skipped
//!
//! # Supported Sources
//!
//! | Source | Module | Row marker |
//! |--------|--------|------------|
//! | Craigslist | [`craigslist`] | `li.result-row` |
//!
//! Extraction is all-or-nothing per row: a row missing any field is reported
//! as a [`SkipReason`] and never produces a partial listing.

pub mod craigslist;

use thiserror::Error;

/// Why a listing row was dropped by the extractor.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    #[error("no housing descriptor")]
    MissingHousingInfo,

    #[error("housing descriptor has no '-' separator")]
    MalformedHousingInfo,

    #[error("no bedroom count in housing descriptor")]
    NoBedroomCount,

    #[error("no square footage in housing descriptor")]
    NoSquareFootage,

    #[error("no posting timestamp")]
    MissingTimestamp,

    #[error("no title")]
    MissingTitle,

    #[error("missing or unparsable price")]
    MissingOrInvalidPrice,

    #[error("no link to the posting")]
    MissingLink,
}
