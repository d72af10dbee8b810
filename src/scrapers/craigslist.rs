//! Craigslist apartment search-results scraper.
//!
//! Each result on a search page is an `li.result-row` element shaped roughly
//! like this:
//!
//! ```html
//! <li class="result-row">
//!   <a href="https://sandiego.craigslist.org/.../7290000001.html" class="result-image">
//!     <span class="result-price">$2150</span>
//!   </a>
//!   <time class="result-date" datetime="2021-03-04 12:31">Mar  4</time>
//!   <a href="..." class="result-title">Sunny 2BR near the park</a>
//!   <span class="housing">2br - 950ft2 -</span>
//! </li>
//! ```
//!
//! The housing descriptor (`2br - 950ft2`) carries both the bedroom count and
//! the square footage and is parsed by [`parse_housing`].

use super::SkipReason;
use crate::models::Listing;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("li.result-row").unwrap());
static HOUSING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.housing").unwrap());
static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result-title").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SPAN_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());

static BEDROOMS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)br").unwrap());
static SQFT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)ft2").unwrap());

/// Listings extracted from one page, with the reasons for every skipped row.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Rows found on the page.
    pub found: usize,
    /// Surviving listings in page order.
    pub listings: Vec<Listing>,
    /// Skip reasons in page order.
    pub skipped: Vec<SkipReason>,
}

/// Find every listing row in a parsed search-results page, in page order.
///
/// A page with no rows (or markup too broken to contain any) yields an empty
/// iterator.
pub fn locate_listings(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.select(&ROW_SELECTOR)
}

/// Parse a search-results page and extract every listing on it.
///
/// Never fails: rows that cannot be extracted are recorded in
/// [`PageExtraction::skipped`].
#[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
pub fn extract_page(html: &str) -> PageExtraction {
    let document = Html::parse_document(html);
    let mut page = PageExtraction::default();

    for (index, row) in locate_listings(&document).enumerate() {
        page.found += 1;
        match extract_listing(row) {
            Ok(listing) => page.listings.push(listing),
            Err(reason) => {
                debug!(
                    index,
                    %reason,
                    row = %truncate_for_log(&row.html(), 200),
                    "Skipping listing row"
                );
                page.skipped.push(reason);
            }
        }
    }

    page
}

/// Extract a [`Listing`] from a single `li.result-row` element.
///
/// Fields are read in a fixed order and the first missing one decides the
/// [`SkipReason`].
pub fn extract_listing(row: ElementRef<'_>) -> Result<Listing, SkipReason> {
    let housing = row
        .select(&HOUSING_SELECTOR)
        .next()
        .map(element_text)
        .ok_or(SkipReason::MissingHousingInfo)?;
    let (bedrooms, sqft) = parse_housing(&housing)?;

    let posted_at = row
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|time| time.value().attr("datetime"))
        .ok_or(SkipReason::MissingTimestamp)?
        .to_string();

    let title = row
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .ok_or(SkipReason::MissingTitle)?;

    let anchor = row.select(&ANCHOR_SELECTOR).next();

    let price = anchor
        .and_then(|a| a.select(&SPAN_SELECTOR).next())
        .map(element_text)
        .and_then(|text| parse_price(&text))
        .ok_or(SkipReason::MissingOrInvalidPrice)?;

    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .ok_or(SkipReason::MissingLink)?
        .to_string();

    Ok(Listing {
        posted_at,
        title,
        price,
        bedrooms,
        sqft,
        link,
    })
}

/// Parse a housing descriptor such as `"2br - 950ft2 -"` into `(bedrooms, sqft)`.
///
/// The descriptor is split on its first `-`; the bedroom count must appear as
/// digits followed by `br` before the separator and the footage as digits
/// followed by `ft2` after it. Zero footage is rejected.
pub fn parse_housing(descriptor: &str) -> Result<(f64, f64), SkipReason> {
    let (bedrooms_part, sqft_part) = descriptor
        .split_once('-')
        .ok_or(SkipReason::MalformedHousingInfo)?;

    let bedrooms = first_number(&BEDROOMS_RE, bedrooms_part.trim())
        .ok_or(SkipReason::NoBedroomCount)?;
    let sqft = first_number(&SQFT_RE, sqft_part.trim())
        .filter(|sqft| *sqft > 0.0)
        .ok_or(SkipReason::NoSquareFootage)?;

    Ok((bedrooms, sqft))
}

// Digit runs too long for an f64 parse to infinity and are rejected.
fn first_number(re: &Regex, segment: &str) -> Option<f64> {
    let value: f64 = re.captures(segment)?.get(1)?.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

// Thousands separators are not accepted: "$1,950" does not parse.
fn parse_price(text: &str) -> Option<f64> {
    let price: f64 = text.trim().trim_start_matches('$').parse().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
