// Price source trait: swap-ready abstraction over where OHLC rows come from.
//
// Sources hand back a loosely-typed table exactly as the provider shaped it
// (nested column keys, text cells, raw timestamps). The loader is the only
// place that normalizes it into a PriceSeries.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bar interval for historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Chart API representation.
    pub fn as_query_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_str())
    }
}

/// Which slice of history to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// First date to include (unbounded when `None`).
    pub start: Option<NaiveDate>,
    /// Last date to include (today when `None`).
    pub end: Option<NaiveDate>,
    pub interval: Interval,
}

/// A single raw cell as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

impl RawCell {
    /// Lenient numeric coercion: anything that is not a finite number
    /// becomes missing.
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            RawCell::Number(n) => *n,
            RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
            RawCell::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<Option<f64>> for RawCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawCell::Missing, RawCell::Number)
    }
}

/// A raw index entry, before normalization to a calendar date.
#[derive(Debug, Clone, PartialEq)]
pub enum RawStamp {
    /// Seconds since the Unix epoch, already shifted to exchange-local time.
    Unix(i64),
    Text(String),
}

/// Column key as a provider shaped it. Multi-instrument downloads key
/// columns by `(field, instrument)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKey {
    Flat(String),
    Nested { field: String, instrument: String },
}

impl ColumnKey {
    /// The column name once the instrument level is dropped.
    pub fn field(&self) -> &str {
        match self {
            ColumnKey::Flat(name) => name,
            ColumnKey::Nested { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub key: ColumnKey,
    pub cells: Vec<RawCell>,
}

/// Provider-shaped table: one index entry per row, columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPriceTable {
    pub index: Vec<RawStamp>,
    pub columns: Vec<RawColumn>,
}

/// Trait for fetching OHLC rows for a ticker.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch rows for `ticker` over the requested range and interval.
    async fn fetch(&self, ticker: &str, options: &LoadOptions) -> Result<RawPriceTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_accepts_numbers_and_numeric_text() {
        assert_eq!(RawCell::Number(1.5).coerce(), Some(1.5));
        assert_eq!(RawCell::Text(" 42.25 ".to_string()).coerce(), Some(42.25));
    }

    #[test]
    fn coerce_turns_garbage_into_missing() {
        assert_eq!(RawCell::Text("n/a".to_string()).coerce(), None);
        assert_eq!(RawCell::Text(String::new()).coerce(), None);
        assert_eq!(RawCell::Number(f64::NAN).coerce(), None);
        assert_eq!(RawCell::Number(f64::INFINITY).coerce(), None);
        assert_eq!(RawCell::Missing.coerce(), None);
    }

    #[test]
    fn nested_key_drops_instrument() {
        let key = ColumnKey::Nested {
            field: "Close".to_string(),
            instrument: "AAPL".to_string(),
        };
        assert_eq!(key.field(), "Close");
    }
}
