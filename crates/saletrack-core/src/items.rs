use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A discounted product as it appears in the final report.
///
/// Built once per product by the scraper's assembler and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub name: String,
    /// Absolute product URL with query and fragment removed. Used as the
    /// deduplication key.
    pub url: String,
    pub sale_price: Decimal,
    /// `None` only when the scan keeps undiscounted items.
    pub original_price: Option<Decimal>,
    /// Whole percent, `round((original - sale) / original * 100)`.
    pub discount_percent: u32,
    pub amount_saved: Decimal,
    /// Distinct normalized size labels in canonical order. Empty means unknown.
    pub sizes: Vec<String>,
    pub website: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SaleItem {
    /// Sizes joined for display, or `"N/A"` when none were resolved.
    #[must_use]
    pub fn sizes_display(&self) -> String {
        if self.sizes.is_empty() {
            "N/A".to_string()
        } else {
            self.sizes.join(", ")
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sink serialization error: {0}")]
    Serialize(String),
}

/// Optional destination for scan results, keyed by item URL.
///
/// The scanner never reads from a sink; callers hand it the finished item
/// list after a run.
pub trait ItemSink {
    /// Records one run's items. Returns how many URLs were new or changed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the items cannot be persisted.
    fn record(&mut self, items: &[SaleItem], scraped_at: DateTime<Utc>)
        -> Result<usize, SinkError>;
}
