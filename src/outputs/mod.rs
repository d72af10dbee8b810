//! Output generation for the scraped dataset.
//!
//! # Submodules
//!
//! - [`json`]: Serializes the run's records to JSON and stores them through a [`json::Sink`]
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── craigslist-rental-data/
//!     ├── rent_data_2021_03_04.json
//!     └── rent_data_2021_03_05.json
//! ```
//!
//! One artifact is written per run date; a second run on the same date
//! replaces the first.

pub mod json;
