//! JSON file history of scanned items, keyed by product URL.
//!
//! Each entry keeps the latest item record and a list of price observations.
//! An observation is appended only when the sale price differs from the last
//! one recorded for that URL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use saletrack_core::{ItemSink, SaleItem, SinkError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Observation {
    pub scraped_at: DateTime<Utc>,
    pub sale_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct HistoryEntry {
    pub latest: SaleItem,
    pub observations: Vec<Observation>,
}

#[derive(Debug)]
pub(crate) struct JsonHistorySink {
    path: PathBuf,
    entries: BTreeMap<String, HistoryEntry>,
}

impl JsonHistorySink {
    /// Opens the history at `path`, starting empty if the file does not exist.
    pub(crate) fn open(path: &Path) -> Result<Self, SinkError> {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| SinkError::Serialize(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(SinkError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    #[cfg(test)]
    pub(crate) fn entry(&self, url: &str) -> Option<&HistoryEntry> {
        self.entries.get(url)
    }

    fn save(&self) -> Result<(), SinkError> {
        let io_err = |source| SinkError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| SinkError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl ItemSink for JsonHistorySink {
    fn record(
        &mut self,
        items: &[SaleItem],
        scraped_at: DateTime<Utc>,
    ) -> Result<usize, SinkError> {
        let mut changed = 0;
        for item in items {
            let observation = Observation {
                scraped_at,
                sale_price: item.sale_price,
            };
            match self.entries.get_mut(&item.url) {
                Some(entry) => {
                    let price_moved = entry
                        .observations
                        .last()
                        .map_or(true, |last| last.sale_price != item.sale_price);
                    if price_moved {
                        entry.observations.push(observation);
                    }
                    if price_moved || entry.latest != *item {
                        changed += 1;
                    }
                    entry.latest = item.clone();
                }
                None => {
                    self.entries.insert(
                        item.url.clone(),
                        HistoryEntry {
                            latest: item.clone(),
                            observations: vec![observation],
                        },
                    );
                    changed += 1;
                }
            }
        }
        self.save()?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item(slug: &str, sale_cents: i64) -> SaleItem {
        SaleItem {
            name: slug.replace('-', " "),
            url: format!("https://www.filson.com/products/{slug}"),
            sale_price: Decimal::new(sale_cents, 2),
            original_price: Some(Decimal::new(11900, 2)),
            discount_percent: 70,
            amount_saved: Decimal::new(11900 - sale_cents, 2),
            sizes: vec!["L".to_owned()],
            website: "Filson".to_owned(),
            image_url: None,
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonHistorySink::open(&dir.path().join("history.json")).unwrap();
        assert!(sink.entries.is_empty());
    }

    #[test]
    fn records_new_items_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let mut sink = JsonHistorySink::open(&path).unwrap();

        let changed = sink
            .record(&[item("wool-cruiser", 3570), item("tin-vest", 7500)], at(1))
            .unwrap();
        assert_eq!(changed, 2);
        assert!(path.exists());

        let reopened = JsonHistorySink::open(&path).unwrap();
        let entry = reopened
            .entry("https://www.filson.com/products/wool-cruiser")
            .unwrap();
        assert_eq!(entry.observations.len(), 1);
        assert_eq!(entry.observations[0].sale_price, Decimal::new(3570, 2));
    }

    #[test]
    fn unchanged_item_is_not_counted_or_observed_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut sink = JsonHistorySink::open(&path).unwrap();
        sink.record(&[item("wool-cruiser", 3570)], at(1)).unwrap();

        let changed = sink.record(&[item("wool-cruiser", 3570)], at(2)).unwrap();
        assert_eq!(changed, 0);
        let entry = sink
            .entry("https://www.filson.com/products/wool-cruiser")
            .unwrap();
        assert_eq!(entry.observations.len(), 1);
    }

    #[test]
    fn price_change_appends_observation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut sink = JsonHistorySink::open(&path).unwrap();
        sink.record(&[item("wool-cruiser", 3570)], at(1)).unwrap();
        drop(sink);

        let mut sink = JsonHistorySink::open(&path).unwrap();
        let changed = sink.record(&[item("wool-cruiser", 2999)], at(5)).unwrap();
        assert_eq!(changed, 1);

        let entry = sink
            .entry("https://www.filson.com/products/wool-cruiser")
            .unwrap();
        assert_eq!(entry.observations.len(), 2);
        assert_eq!(entry.observations[1].scraped_at, at(5));
        assert_eq!(entry.latest.sale_price, Decimal::new(2999, 2));
    }

    #[test]
    fn size_change_counts_without_new_observation() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonHistorySink::open(&dir.path().join("history.json")).unwrap();
        sink.record(&[item("wool-cruiser", 3570)], at(1)).unwrap();

        let mut restocked = item("wool-cruiser", 3570);
        restocked.sizes = vec!["M".to_owned(), "L".to_owned()];
        assert_eq!(sink.record(&[restocked], at(2)).unwrap(), 1);
        let entry = sink
            .entry("https://www.filson.com/products/wool-cruiser")
            .unwrap();
        assert_eq!(entry.observations.len(), 1);
        assert_eq!(entry.latest.sizes, vec!["M", "L"]);
    }

    #[test]
    fn corrupt_file_is_a_serialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonHistorySink::open(&path).unwrap_err();
        assert!(matches!(err, SinkError::Serialize(_)));
    }
}
