// Simple returns: percentage change of Close from the previous row.

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::prices::series::{PriceSeries, CLOSE};

pub const RETURN: &str = "Return";

/// Append a `Return` column and drop rows where it is undefined.
///
/// `Return[i] = Close[i] / Close[prev] - 1`, where `prev` is the closest
/// earlier row with a Close. The first row never has a return, and neither
/// does a row with a missing Close or a zero previous Close; those rows are
/// dropped so the column has no missing values. Adding returns twice is an
/// error rather than silently eating another row.
pub fn add_returns(series: &mut PriceSeries) -> Result<()> {
    if series.has_column(RETURN) {
        return Err(AnalysisError::ReturnsAlreadyAdded);
    }
    let close = series
        .column(CLOSE)
        .ok_or_else(|| AnalysisError::InvalidParameter(format!("series has no {CLOSE} column")))?;

    let returns = pct_change(close);
    series.set_column(RETURN, returns)?;
    let dropped = series.drop_missing_in(&[RETURN]);
    debug!(rows = dropped, "Dropped rows without a return");
    Ok(())
}

/// Forward-filled percentage change; non-finite results are missing.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut previous: Option<f64> = None;
    values
        .iter()
        .map(|current| {
            let current = (*current)?;
            let change = previous.map(|prev| current / prev - 1.0);
            previous = Some(current);
            change.filter(|c| c.is_finite())
        })
        .collect()
}
