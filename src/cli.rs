//! Command-line interface definitions for the rental scraper.
//!
//! Every option can be given as a flag; the output directory can also come
//! from the environment.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the rental scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the built-in San Diego neighborhoods into ./data
/// rental_scraper -o ./data
///
/// # Use a neighborhood list from a YAML file, two fetches at a time
/// rental_scraper -o ./data -c neighborhoods.yaml --concurrency 2
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory the dataset is written under
    #[arg(short, long, env = "RENTAL_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Optional path to a YAML config listing the neighborhoods to scrape
    #[arg(short, long)]
    pub config: Option<String>,

    /// Maximum number of search pages fetched at once (overrides the config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-page fetch timeout in seconds (overrides the config)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// File the dataset under this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}
