// Local CSV price source for offline analysis.
//
// Expects a header row with a `Date` column; every other column is kept
// as text and coerced by the loader, so stray values like "n/a" become
// missing instead of failing the whole file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::source::{ColumnKey, LoadOptions, PriceSource, RawCell, RawColumn, RawPriceTable, RawStamp};

const DATE_COLUMN: &str = "Date";

pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse CSV text from any reader. Split out from `fetch` for tests.
    pub fn read_table<R: std::io::Read>(reader: R) -> Result<RawPriceTable> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers().context("Failed to read CSV header")?.clone();

        let date_idx = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(DATE_COLUMN))
            .ok_or_else(|| anyhow::anyhow!("CSV has no {DATE_COLUMN} column"))?;

        let mut index = Vec::new();
        let mut columns: Vec<RawColumn> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(_, h)| RawColumn {
                key: ColumnKey::Flat(h.trim().to_string()),
                cells: Vec::new(),
            })
            .collect();

        for (line, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to parse CSV row {}", line + 2))?;
            index.push(RawStamp::Text(record.get(date_idx).unwrap_or("").to_string()));

            let values = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date_idx)
                .map(|(_, v)| v);
            for (column, value) in columns.iter_mut().zip(values) {
                let cell = if value.trim().is_empty() {
                    RawCell::Missing
                } else {
                    RawCell::Text(value.to_string())
                };
                column.cells.push(cell);
            }
        }

        Ok(RawPriceTable { index, columns })
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    /// The file is the whole history; the loader narrows it to the range.
    async fn fetch(&self, ticker: &str, _options: &LoadOptions) -> Result<RawPriceTable> {
        debug!(ticker = ticker, path = %self.path.display(), "Reading CSV prices");
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        Self::read_table(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flat_columns_and_keeps_text_cells() {
        let csv = "Date,Open,Close,Volume\n2024-01-02,10,11,100\n2024-01-03,11,oops,\n";
        let table = CsvPriceSource::read_table(csv.as_bytes()).unwrap();

        assert_eq!(table.index.len(), 2);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[1].key, ColumnKey::Flat("Close".to_string()));
        assert_eq!(table.columns[1].cells[1], RawCell::Text("oops".to_string()));
        assert_eq!(table.columns[2].cells[1], RawCell::Missing);
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let csv = "Open,Close\n1,2\n";
        assert!(CsvPriceSource::read_table(csv.as_bytes()).is_err());
    }
}
