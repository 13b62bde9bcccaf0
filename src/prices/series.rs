// PriceSeries: an ordered, date-indexed table of named float columns.
//
// Missing values are `None`. Every column has exactly one value per index
// row; indicator and return columns are appended as the series moves
// through the pipeline.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AnalysisError, Result};

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

/// A single named column of optional floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Daily (or weekly/monthly) price table for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl PriceSeries {
    /// Create an empty-columned series over the given dates.
    ///
    /// The index must be strictly increasing; the loader guarantees this
    /// for fetched data.
    pub fn new(ticker: impl Into<String>, index: Vec<NaiveDate>) -> Result<Self> {
        if index.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::InvalidParameter(
                "price index must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            ticker: ticker.into(),
            index,
            columns: Vec::new(),
        })
    }

    /// Builder-style column insertion.
    pub fn with_column(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.set_column(name, values)?;
        Ok(self)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Insert a column, replacing any existing column of the same name
    /// in place so column order stays stable.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(AnalysisError::ColumnLength {
                column: name.to_string(),
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Number of missing values in a column (`None` if the column is absent).
    pub fn missing_count(&self, name: &str) -> Option<usize> {
        self.column(name)
            .map(|values| values.iter().filter(|v| v.is_none()).count())
    }

    /// Keep only the rows whose mask entry is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.index.len());
        self.index = filter_by_mask(&self.index, keep);
        for column in &mut self.columns {
            column.values = filter_by_mask(&column.values, keep);
        }
    }

    /// Drop rows where any of the named columns is missing.
    /// Returns the number of rows dropped.
    pub fn drop_missing_in(&mut self, names: &[&str]) -> usize {
        let selected: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| names.contains(&c.name.as_str()))
            .collect();
        let keep: Vec<bool> = (0..self.index.len())
            .map(|row| selected.iter().all(|c| c.values[row].is_some()))
            .collect();
        let before = self.len();
        self.retain_rows(&keep);
        before - self.len()
    }

    /// Drop rows with a missing value in any column.
    pub fn drop_any_missing(&mut self) -> usize {
        let names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.drop_missing_in(&refs)
    }

    /// Drop rows where every column is missing. A series without columns
    /// has nothing but missing rows, so it ends up empty.
    pub fn drop_all_missing(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.index.len())
            .map(|row| self.columns.iter().any(|c| c.values[row].is_some()))
            .collect();
        let before = self.len();
        self.retain_rows(&keep);
        before - self.len()
    }

    /// Last `n` rows as `(date, values)` in column order, for display.
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, Vec<Option<f64>>)> {
        let start = self.len().saturating_sub(n);
        (start..self.len())
            .map(|row| {
                let values = self.columns.iter().map(|c| c.values[row]).collect();
                (self.index[row], values)
            })
            .collect()
    }
}

fn filter_by_mask<T: Clone>(items: &[T], keep: &[bool]) -> Vec<T> {
    items
        .iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(item, _)| item.clone())
        .collect()
}
