// News export loading: one column of a CSV file as optional strings.

use std::path::Path;

use anyhow::{Context, Result};

/// Read `column` from a headed CSV file. Blank cells are missing.
pub fn load_news_column(path: &Path, column: &str) -> Result<Vec<Option<String>>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_news_column(file, column).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn read_news_column<R: std::io::Read>(reader: R, column: &str) -> Result<Vec<Option<String>>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header")?;
    let idx = headers.iter().position(|h| h.trim() == column).ok_or_else(|| {
        let available: Vec<&str> = headers.iter().collect();
        anyhow::anyhow!("No column {column:?} (available: {})", available.join(", "))
    })?;

    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record.context("Malformed CSV record")?;
        let value = record
            .get(idx)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string);
        values.push(value);
    }
    Ok(values)
}
