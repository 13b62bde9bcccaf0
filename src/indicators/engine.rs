// Indicator engine: clean Close, check length, compute, trim.
//
// The order matters: rows with a missing Close are dropped before any
// indicator runs, so every indicator sees a gap-free slice and every
// indicator column has a clean warm-up prefix. The math itself comes from
// the `ta` crate; this module only masks warm-up rows and trims afterwards
// by exactly one TrimPolicy chosen by the caller.

use serde::{Deserialize, Serialize};
use ta::indicators::{
    BollingerBands, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
    SimpleMovingAverage,
};
use ta::Next;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::prices::series::{PriceSeries, CLOSE};

pub const SMA_FAST: &str = "SMA_20";
pub const SMA_SLOW: &str = "SMA_50";
pub const RSI: &str = "RSI_14";
pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const MACD_HIST: &str = "MACD_Hist";
pub const BB_UPPER: &str = "BB_Upper";
pub const BB_MIDDLE: &str = "BB_Middle";
pub const BB_LOWER: &str = "BB_Lower";

/// Which rows to drop once indicators are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrimPolicy {
    /// Drop rows missing any newly added indicator column. Other sparse
    /// columns (e.g. Volume) are left untouched.
    #[default]
    IndicatorColumns,
    /// Drop rows with a missing value anywhere in the table.
    AnyColumn,
}

/// Bollinger band parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerConfig {
    pub length: usize,
    pub std_dev: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            length: 20,
            std_dev: 2.0,
        }
    }
}

/// Periods for the indicator set plus the trimming policy.
///
/// Column names stay fixed (`SMA_20`, `SMA_50`, `RSI_14`, ...) whatever
/// the periods are, so downstream consumers always find the same columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Bands are opt-in.
    pub bollinger: Option<BollingerConfig>,
    pub trim: TrimPolicy,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_slow: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger: None,
            trim: TrimPolicy::IndicatorColumns,
        }
    }
}

impl IndicatorConfig {
    pub fn with_bollinger(mut self, bands: BollingerConfig) -> Self {
        self.bollinger = Some(bands);
        self
    }

    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }

    /// Index of the last undefined row across every configured indicator.
    pub fn max_warmup(&self) -> usize {
        let mut warmups = vec![
            self.sma_fast.saturating_sub(1),
            self.sma_slow.saturating_sub(1),
            self.rsi_period,
            (self.macd_slow + self.macd_signal).saturating_sub(2),
        ];
        if let Some(bands) = &self.bollinger {
            warmups.push(bands.length.saturating_sub(1));
        }
        warmups.into_iter().max().unwrap_or(0)
    }

    /// Fewest clean rows that still yield one fully-defined row.
    pub fn required_rows(&self) -> usize {
        self.max_warmup() + 1
    }

    /// Names of the columns this configuration appends, in order.
    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names = vec![SMA_FAST, SMA_SLOW, RSI, MACD, MACD_SIGNAL, MACD_HIST];
        if self.bollinger.is_some() {
            names.extend([BB_UPPER, BB_MIDDLE, BB_LOWER]);
        }
        names
    }

    fn validate(&self) -> Result<()> {
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::InvalidParameter(format!(
                "MACD fast span {} must be shorter than slow span {}",
                self.macd_fast, self.macd_slow
            )));
        }
        if let Some(bands) = &self.bollinger {
            if !(bands.std_dev.is_finite() && bands.std_dev > 0.0) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "Bollinger std_dev must be positive, got {}",
                    bands.std_dev
                )));
            }
        }
        Ok(())
    }
}

fn rejected<E: std::fmt::Debug>(name: &'static str, value: usize) -> impl FnOnce(E) -> AnalysisError {
    move |e| AnalysisError::InvalidParameter(format!("{name} period {value} rejected: {e:?}"))
}

/// Feed every close through a streaming indicator, keeping outputs from
/// row `warmup` onward.
fn stream<I, O>(mut indicator: I, close: &[f64], warmup: usize) -> Vec<Option<O>>
where
    I: Next<f64, Output = O>,
{
    close
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let value = indicator.next(c);
            (i >= warmup).then_some(value)
        })
        .collect()
}

/// The configured `ta` indicators, built before any data is touched so a
/// bad period fails as a parameter error.
struct Indicators {
    sma_fast: SimpleMovingAverage,
    sma_slow: SimpleMovingAverage,
    rsi: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
    bands: Option<BollingerBands>,
}

impl Indicators {
    fn new(config: &IndicatorConfig) -> Result<Self> {
        // ta smooths with k = 2/(n+1); n = 2p-1 gives Wilder's 1/p
        let rsi_span = (2 * config.rsi_period).saturating_sub(1);
        let bands = match &config.bollinger {
            Some(b) => Some(
                BollingerBands::new(b.length, b.std_dev).map_err(rejected("Bollinger", b.length))?,
            ),
            None => None,
        };
        Ok(Self {
            sma_fast: SimpleMovingAverage::new(config.sma_fast)
                .map_err(rejected("SMA fast", config.sma_fast))?,
            sma_slow: SimpleMovingAverage::new(config.sma_slow)
                .map_err(rejected("SMA slow", config.sma_slow))?,
            rsi: RelativeStrengthIndex::new(rsi_span).map_err(rejected("RSI", config.rsi_period))?,
            macd: MovingAverageConvergenceDivergence::new(
                config.macd_fast,
                config.macd_slow,
                config.macd_signal,
            )
            .map_err(rejected("MACD", config.macd_slow))?,
            bands,
        })
    }
}

/// Append the indicator set to a copy of `series`.
///
/// Fails with [`AnalysisError::InsufficientData`] when fewer than
/// [`IndicatorConfig::required_rows`] rows have a usable Close. On success
/// every indicator column is fully defined.
pub fn add_indicators(series: &PriceSeries, config: &IndicatorConfig) -> Result<PriceSeries> {
    config.validate()?;
    let indicators = Indicators::new(config)?;
    let mut out = series.clone();

    let close = out.column(CLOSE).ok_or_else(|| {
        AnalysisError::InvalidParameter(format!("series has no {CLOSE} column"))
    })?;

    // Coerce: non-finite closes count as missing, then drop those rows
    let coerced: Vec<Option<f64>> = close.iter().map(|v| v.filter(|x| x.is_finite())).collect();
    out.set_column(CLOSE, coerced)?;
    let dropped = out.drop_missing_in(&[CLOSE]);
    if dropped > 0 {
        debug!(rows = dropped, "Dropped rows with missing Close");
    }

    let required = config.required_rows();
    if out.len() < required {
        return Err(AnalysisError::InsufficientData {
            actual: out.len(),
            required,
        });
    }

    let close: Vec<f64> = out
        .column(CLOSE)
        .map(|c| c.iter().flatten().copied().collect())
        .unwrap_or_default();

    let fast_warmup = config.sma_fast - 1;
    let slow_warmup = config.sma_slow - 1;
    out.set_column(SMA_FAST, stream(indicators.sma_fast, &close, fast_warmup))?;
    out.set_column(SMA_SLOW, stream(indicators.sma_slow, &close, slow_warmup))?;
    out.set_column(RSI, stream(indicators.rsi, &close, config.rsi_period))?;

    let line_warmup = config.macd_slow - 1;
    let signal_warmup = config.macd_slow + config.macd_signal - 2;
    let lines = stream(indicators.macd, &close, line_warmup);
    let after_signal = |i: usize| i >= signal_warmup;
    out.set_column(MACD, lines.iter().map(|l| l.as_ref().map(|l| l.macd)).collect())?;
    out.set_column(
        MACD_SIGNAL,
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| l.as_ref().filter(|_| after_signal(i)).map(|l| l.signal))
            .collect(),
    )?;
    out.set_column(
        MACD_HIST,
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| l.as_ref().filter(|_| after_signal(i)).map(|l| l.histogram))
            .collect(),
    )?;

    if let (Some(bands), Some(params)) = (indicators.bands, &config.bollinger) {
        let rows = stream(bands, &close, params.length - 1);
        out.set_column(BB_UPPER, rows.iter().map(|b| b.as_ref().map(|b| b.upper)).collect())?;
        out.set_column(BB_MIDDLE, rows.iter().map(|b| b.as_ref().map(|b| b.average)).collect())?;
        out.set_column(BB_LOWER, rows.iter().map(|b| b.as_ref().map(|b| b.lower)).collect())?;
    }

    let trimmed = match config.trim {
        TrimPolicy::IndicatorColumns => out.drop_missing_in(&config.column_names()),
        TrimPolicy::AnyColumn => out.drop_any_missing(),
    };

    info!(
        ticker = out.ticker(),
        rows = out.len(),
        trimmed = trimmed,
        policy = ?config.trim,
        "Computed indicators"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_required_rows_is_longest_period() {
        assert_eq!(IndicatorConfig::default().required_rows(), 50);
    }

    #[test]
    fn bollinger_adds_three_columns() {
        let config = IndicatorConfig::default().with_bollinger(BollingerConfig::default());
        assert_eq!(config.column_names().len(), 9);
        assert_eq!(config.required_rows(), 50);
    }

    #[test]
    fn short_sma_slow_leaves_macd_as_longest_warmup() {
        let config = IndicatorConfig {
            sma_slow: 30,
            ..Default::default()
        };
        // MACD signal is first defined at 26 + 9 - 2 = 33
        assert_eq!(config.required_rows(), 34);
    }

    #[test]
    fn zero_period_is_a_parameter_error_not_short_data() {
        let config = IndicatorConfig {
            sma_fast: 0,
            ..Default::default()
        };
        let series = PriceSeries::new("ZERO", Vec::new())
            .unwrap()
            .with_column(CLOSE, Vec::new())
            .unwrap();
        assert!(matches!(
            add_indicators(&series, &config),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn stream_masks_the_warmup_prefix() {
        let close: Vec<f64> = (1..=5).map(f64::from).collect();
        let out = stream(SimpleMovingAverage::new(3).unwrap(), &close, 2);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn inverted_macd_spans_are_rejected() {
        let config = IndicatorConfig {
            macd_fast: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
