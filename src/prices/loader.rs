// Price loading: fetch from a source and normalize into a PriceSeries.
//
// Normalization flattens nested (field, instrument) column keys, turns the
// raw index into calendar dates, coerces every cell to a float, and drops
// rows where nothing at all came back.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use super::series::PriceSeries;
use super::source::{LoadOptions, PriceSource, RawPriceTable, RawStamp};
use crate::error::{AnalysisError, Result};

/// Fetch and normalize prices for one ticker.
///
/// Any source failure, and an empty result, surface as
/// [`AnalysisError::Retrieval`]. There is no retry.
pub async fn load_price(
    source: &dyn PriceSource,
    ticker: &str,
    options: &LoadOptions,
) -> Result<PriceSeries> {
    if let (Some(start), Some(end)) = (options.start, options.end) {
        if start > end {
            return Err(AnalysisError::InvalidParameter(format!(
                "start date {start} is after end date {end}"
            )));
        }
    }

    let raw = source
        .fetch(ticker, options)
        .await
        .map_err(|e| AnalysisError::Retrieval {
            ticker: ticker.to_string(),
            reason: format!("{e:#}"),
        })?;

    let series = normalize(ticker, filter_range(raw, options))?;
    info!(
        ticker = ticker,
        rows = series.len(),
        first = ?series.dates().first(),
        last = ?series.dates().last(),
        "Loaded prices"
    );
    Ok(series)
}

/// Turn a provider-shaped table into a clean, strictly increasing series.
pub fn normalize(ticker: &str, raw: RawPriceTable) -> Result<PriceSeries> {
    let retrieval = |reason: String| AnalysisError::Retrieval {
        ticker: ticker.to_string(),
        reason,
    };

    let rows = raw.index.len();
    if let Some(bad) = raw.columns.iter().find(|c| c.cells.len() != rows) {
        return Err(retrieval(format!(
            "column {} has {} cells for {} index rows",
            bad.key.field(),
            bad.cells.len(),
            rows
        )));
    }

    // Flatten: drop the instrument level, first column per field wins
    let mut seen = HashSet::new();
    let columns: Vec<_> = raw
        .columns
        .iter()
        .filter(|c| {
            let fresh = seen.insert(c.key.field().to_string());
            if !fresh {
                warn!(ticker = ticker, field = c.key.field(), "Duplicate column after flattening, keeping first");
            }
            fresh
        })
        .collect();

    // Parse the index, then order rows by date. A repeated date keeps its
    // last row.
    let mut dated: Vec<(NaiveDate, usize)> = raw
        .index
        .iter()
        .enumerate()
        .filter_map(|(row, stamp)| parse_stamp(stamp).map(|date| (date, row)))
        .collect();
    let unparsed = rows - dated.len();
    if unparsed > 0 {
        warn!(ticker = ticker, rows = unparsed, "Dropped rows with unparseable dates");
    }
    dated.sort_by_key(|(date, row)| (*date, *row));
    let mut ordered: Vec<(NaiveDate, usize)> = Vec::with_capacity(dated.len());
    for (date, row) in dated {
        match ordered.last_mut() {
            Some(last) if last.0 == date => *last = (date, row),
            _ => ordered.push((date, row)),
        }
    }

    let index = ordered.iter().map(|(date, _)| *date).collect();
    let mut series = PriceSeries::new(ticker, index)?;
    for column in columns {
        let values = ordered
            .iter()
            .map(|(_, row)| column.cells[*row].coerce())
            .collect();
        series.set_column(column.key.field(), values)?;
    }

    series.drop_all_missing();
    if series.is_empty() {
        return Err(retrieval("source returned no rows".to_string()));
    }
    Ok(series)
}

/// Normalize a raw index entry to a calendar date.
pub fn parse_stamp(stamp: &RawStamp) -> Option<NaiveDate> {
    match stamp {
        RawStamp::Unix(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.date_naive()),
        RawStamp::Text(text) => {
            let text = text.trim();
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|dt| dt.date())
                })
                .or_else(|| {
                    DateTime::parse_from_rfc3339(text)
                        .ok()
                        .map(|dt| dt.date_naive())
                })
        }
    }
}

/// Keep rows inside `[start, end]`. Applied to every source result, so a
/// provider that ignores part of the range still yields only requested
/// rows. Rows with unparseable dates are left for `normalize` to report.
pub fn filter_range(table: RawPriceTable, options: &LoadOptions) -> RawPriceTable {
    if options.start.is_none() && options.end.is_none() {
        return table;
    }
    let keep: Vec<bool> = table
        .index
        .iter()
        .map(|stamp| match parse_stamp(stamp) {
            Some(date) => {
                options.start.is_none_or(|s| date >= s) && options.end.is_none_or(|e| date <= e)
            }
            None => true,
        })
        .collect();

    let pick = |items: Vec<_>| -> Vec<_> {
        items
            .into_iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(item, _)| item)
            .collect()
    };

    RawPriceTable {
        index: pick(table.index),
        columns: table
            .columns
            .into_iter()
            .map(|mut c| {
                c.cells = c
                    .cells
                    .into_iter()
                    .zip(&keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(cell, _)| cell)
                    .collect();
                c
            })
            .collect(),
    }
}
