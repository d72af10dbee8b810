//! JSON dataset output.
//!
//! A run's records are serialized as one JSON array and stored under a
//! date-keyed name:
//!
//! ```text
//! {output_dir}/
//! └── craigslist-rental-data/
//!     ├── rent_data_2021_03_04.json
//!     └── rent_data_2021_03_05.json
//! ```
//!
//! Storage goes through the [`Sink`] trait; [`FsSink`] writes below a root
//! directory. A failed store is the only error that fails a run.

use crate::models::ListingRecord;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Destination for the finished dataset.
pub trait Sink {
    async fn store(&self, key: &str, payload: &[u8]) -> Result<(), StoreError>;
}

/// [`Sink`] that writes each key as a file below `root`.
///
/// The payload is written to a temporary sibling file first and renamed into
/// place, so an interrupted run never leaves a truncated dataset under `key`.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Sink for FsSink {
    #[instrument(level = "info", skip_all, fields(root = %self.root.display(), %key))]
    async fn store(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, payload)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            error!(path = %path.display(), error = %e, "Failed to move dataset into place");
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::io(&path, e));
        }

        info!(path = %path.display(), bytes = payload.len(), "Wrote dataset");
        Ok(())
    }
}

/// Storage key for a run on `date`: `{prefix}/rent_data_{YYYY_MM_DD}.json`.
pub fn output_key(prefix: &str, date: NaiveDate) -> String {
    let file = format!("rent_data_{}.json", date.format("%Y_%m_%d"));
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file
    } else {
        format!("{prefix}/{file}")
    }
}

/// Serialize records as a JSON array indented with four spaces.
pub fn to_json(records: &[ListingRecord]) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    Ok(buf)
}

/// Serialize `records` and store them under `key`.
#[instrument(level = "info", skip_all, fields(%key, records = records.len()))]
pub async fn write_dataset<S: Sink>(
    sink: &S,
    key: &str,
    records: &[ListingRecord],
) -> Result<(), StoreError> {
    let payload = to_json(records)?;
    sink.store(key, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "rental_scraper_{label}_{}_{nanos}",
            std::process::id()
        ))
    }

    fn records() -> Vec<ListingRecord> {
        vec![
            ListingRecord {
                neighborhood: "Hillcrest".to_string(),
                posted_at: "2021-03-04 12:31".to_string(),
                title: "Sunny 2BR near the park".to_string(),
                price: 2150.0,
                bedrooms: 2.0,
                sqft: 950.0,
                link: "https://sandiego.craigslist.org/cen/apa/d/sunny/7290000001.html"
                    .to_string(),
            },
            ListingRecord {
                neighborhood: "North Park".to_string(),
                posted_at: "2021-03-04T09:10:00-0800".to_string(),
                title: "Craftsman bungalow".to_string(),
                price: 2895.0,
                bedrooms: 3.0,
                sqft: 1250.0,
                link: "/apa/d/craftsman/7290000003.html".to_string(),
            },
        ]
    }

    #[test]
    fn test_output_key() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(
            output_key("craigslist-rental-data", date),
            "craigslist-rental-data/rent_data_2021_03_04.json"
        );
        assert_eq!(output_key("data/", date), "data/rent_data_2021_03_04.json");
        assert_eq!(output_key("", date), "rent_data_2021_03_04.json");
    }

    #[test]
    fn test_to_json_round_trip() {
        let records = records();
        let payload = to_json(&records).unwrap();
        let parsed: Vec<ListingRecord> = serde_json::from_slice(&payload).unwrap();

        assert_eq!(parsed, records);
        assert!(String::from_utf8(payload).unwrap().contains("\n        \"neighborhood\""));
    }

    #[test]
    fn test_to_json_empty() {
        let payload = to_json(&[]).unwrap();
        assert_eq!(payload, b"[]");
    }

    #[tokio::test]
    async fn test_fs_sink_writes_dataset() {
        let root = temp_root("write");
        let sink = FsSink::new(&root);
        let key = "craigslist-rental-data/rent_data_2021_03_04.json";

        write_dataset(&sink, key, &records()).await.unwrap();

        let written = std::fs::read(sink.path_for(key)).unwrap();
        let parsed: Vec<ListingRecord> = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed, records());
        assert!(!sink.path_for(key).with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_fs_sink_overwrites_same_key() {
        let root = temp_root("overwrite");
        let sink = FsSink::new(&root);
        let key = "rent_data_2021_03_04.json";

        write_dataset(&sink, key, &records()).await.unwrap();
        write_dataset(&sink, key, &records()[..1]).await.unwrap();

        let parsed: Vec<ListingRecord> =
            serde_json::from_slice(&std::fs::read(sink.path_for(key)).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_fs_sink_reports_io_error() {
        let root = temp_root("blocked");
        std::fs::create_dir_all(root.parent().unwrap()).unwrap();
        // A plain file where the prefix directory should be.
        std::fs::write(&root, b"not a directory").unwrap();
        let sink = FsSink::new(&root);

        let err = sink
            .store("prefix/rent_data_2021_03_04.json", b"[]")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));

        std::fs::remove_file(&root).unwrap();
    }
}
