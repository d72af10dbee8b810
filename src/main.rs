//! # Rental Scraper
//!
//! Scrapes apartment listings from Craigslist search-results pages, one page
//! per configured neighborhood, and writes the combined listings as one JSON
//! dataset per day.
//!
//! ## Usage
//!
//! ```sh
//! rental_scraper -o ./data
//! rental_scraper -o ./data -c neighborhoods.yaml
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Configuration**: Resolve the neighborhood list to `{name, url}` pairs
//! 2. **Fetching**: Download each neighborhood's search page (4 at a time by default)
//! 3. **Extraction**: Locate listing rows and extract price, bedrooms, footage, etc.
//! 4. **Aggregation**: Merge neighborhoods in configuration order
//! 5. **Output**: Write `rent_data_YYYY_MM_DD.json`
//!
//! Listings that cannot be fully extracted and neighborhoods that cannot be
//! fetched are logged and left out. Only a failure to write the dataset fails
//! the run.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod stats;
mod utils;

use cli::Cli;
use config::ScrapeConfig;
use fetch::HttpFetcher;
use outputs::json::{self, FsSink};
use utils::{ensure_writable_dir, run_date};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("rental_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => {
            info!("No config file given; using built-in San Diego neighborhoods");
            ScrapeConfig::default()
        }
    };
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.fetch_timeout_secs = timeout_secs;
    }
    let sources = config.sources()?;
    if sources.is_empty() {
        warn!("No neighborhoods configured; the dataset will be empty");
    }

    // Early check: fail before scraping if the dataset can't be written
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let date = run_date(args.date);
    let key = json::output_key(&config.output_prefix, date);
    info!(
        neighborhoods = sources.len(),
        concurrency = config.concurrency,
        timeout_secs = config.fetch_timeout().as_secs(),
        %key,
        "Starting scrape"
    );

    // ---- Scrape all neighborhoods ----
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout())?;
    let run = aggregate::aggregate(
        &fetcher,
        &sources,
        config.concurrency,
        config.fetch_timeout(),
    );

    // Nothing is written unless the whole run completes.
    let result = tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; no dataset written");
            return Err("scrape interrupted".into());
        }
    };

    // ---- Output ----
    let sink = FsSink::new(&args.output_dir);
    if let Err(e) = json::write_dataset(&sink, &key, &result.records).await {
        error!(%key, error = %e, "Failed to write dataset");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        records = result.records.len(),
        skipped = result.skipped(),
        failed_neighborhoods = result.failed_neighborhoods(),
        path = %sink.path_for(&key).display(),
        "Execution complete"
    );

    Ok(())
}
