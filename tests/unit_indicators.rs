// Unit tests for the indicator engine and returns.
//
// Tests the row-count and warm-up contract of add_indicators, the
// InsufficientData boundary, both trim policies, and add_returns.

use chrono::{Days, NaiveDate};

use tickertape::error::AnalysisError;
use tickertape::indicators::engine::{
    add_indicators, BollingerConfig, IndicatorConfig, TrimPolicy, BB_LOWER, BB_MIDDLE, BB_UPPER,
    MACD, MACD_HIST, MACD_SIGNAL, RSI, SMA_FAST, SMA_SLOW,
};
use tickertape::indicators::returns::{add_returns, RETURN};
use tickertape::prices::analyzer::StockAnalyzer;
use tickertape::prices::series::{PriceSeries, CLOSE, VOLUME};

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n).map(|i| start + Days::new(i as u64)).collect()
}

fn series(closes: &[Option<f64>]) -> PriceSeries {
    PriceSeries::new("MOCK", dates(closes.len()))
        .unwrap()
        .with_column(CLOSE, closes.to_vec())
        .unwrap()
}

fn rising(from: usize, to: usize) -> PriceSeries {
    let closes: Vec<Option<f64>> = (from..to).map(|v| Some(v as f64)).collect();
    series(&closes)
}

// ============================================================
// add_indicators: row counts and values
// ============================================================

#[test]
fn exactly_fifty_rows_yield_one_row() {
    let out = add_indicators(&rising(10, 60), &IndicatorConfig::default()).unwrap();
    assert_eq!(out.len(), 1);
    let sma = out.column(SMA_SLOW).unwrap()[0].unwrap();
    assert!((sma - 34.5).abs() < 1e-9);
    assert_eq!(out.dates()[0], NaiveDate::from_ymd_opt(2024, 2, 19).unwrap());
}

#[test]
fn output_has_n_minus_49_rows_and_no_missing_indicators() {
    let out = add_indicators(&rising(1, 121), &IndicatorConfig::default()).unwrap();
    assert_eq!(out.len(), 120 - 49);
    for name in [SMA_FAST, SMA_SLOW, RSI, MACD, MACD_SIGNAL, MACD_HIST] {
        assert_eq!(out.missing_count(name), Some(0), "{name} has gaps");
    }
    assert!(!out.has_column(BB_UPPER));
}

#[test]
fn steady_rise_has_rsi_near_100() {
    let out = add_indicators(&rising(10, 70), &IndicatorConfig::default()).unwrap();
    let rsi = out.column(RSI).unwrap();
    assert!(rsi.iter().all(|v| (99.0..=100.0).contains(&v.unwrap())));
    // the seed's small loss share keeps decaying
    assert!(rsi[rsi.len() - 1] >= rsi[0]);
}

#[test]
fn flat_prices_have_rsi_50_and_zero_macd() {
    let closes = vec![Some(25.0); 60];
    let out = add_indicators(&series(&closes), &IndicatorConfig::default()).unwrap();
    assert!(out.column(RSI).unwrap().iter().all(|v| *v == Some(50.0)));
    assert!(out
        .column(MACD_HIST)
        .unwrap()
        .iter()
        .all(|v| v.unwrap().abs() < 1e-12));
}

#[test]
fn input_series_is_not_modified() {
    let input = rising(1, 80);
    let _ = add_indicators(&input, &IndicatorConfig::default()).unwrap();
    assert_eq!(input.len(), 79);
    assert_eq!(input.column_names(), vec![CLOSE]);
}

// ============================================================
// add_indicators: InsufficientData boundary
// ============================================================

#[test]
fn forty_nine_rows_are_insufficient() {
    let err = add_indicators(&rising(10, 59), &IndicatorConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientData {
            actual: 49,
            required: 50
        }
    ));
    assert!(err.to_string().contains("not enough clean data"));
}

#[test]
fn missing_closes_count_against_the_minimum() {
    let mut closes: Vec<Option<f64>> = (0..52).map(|v| Some(v as f64 + 1.0)).collect();
    closes[3] = None;
    closes[10] = Some(f64::NAN);
    closes[20] = None;
    let err = add_indicators(&series(&closes), &IndicatorConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientData { actual: 49, .. }
    ));
}

#[test]
fn ten_rows_fail() {
    assert!(matches!(
        add_indicators(&rising(10, 20), &IndicatorConfig::default()),
        Err(AnalysisError::InsufficientData { actual: 10, .. })
    ));
}

// ============================================================
// Trim policy and Bollinger bands
// ============================================================

#[test]
fn indicator_trim_keeps_rows_with_sparse_volume() {
    let mut volume: Vec<Option<f64>> = vec![Some(1_000.0); 60];
    volume[55] = None;
    let input = rising(1, 61).with_column(VOLUME, volume).unwrap();

    let kept = add_indicators(&input, &IndicatorConfig::default()).unwrap();
    assert_eq!(kept.len(), 11);
    assert_eq!(kept.missing_count(VOLUME), Some(1));

    let strict = IndicatorConfig::default().with_trim(TrimPolicy::AnyColumn);
    let trimmed = add_indicators(&input, &strict).unwrap();
    assert_eq!(trimmed.len(), 10);
    assert_eq!(trimmed.missing_count(VOLUME), Some(0));
}

#[test]
fn bollinger_bands_bracket_the_middle() {
    let closes: Vec<Option<f64>> = (0..80)
        .map(|i| Some(100.0 + (i as f64 * 0.7).sin() * 5.0))
        .collect();
    let config = IndicatorConfig::default().with_bollinger(BollingerConfig::default());
    let out = add_indicators(&series(&closes), &config).unwrap();
    assert_eq!(out.len(), 80 - 49);

    let upper = out.column(BB_UPPER).unwrap();
    let middle = out.column(BB_MIDDLE).unwrap();
    let lower = out.column(BB_LOWER).unwrap();
    let sma = out.column(SMA_FAST).unwrap();
    for i in 0..out.len() {
        let (u, m, l) = (upper[i].unwrap(), middle[i].unwrap(), lower[i].unwrap());
        assert!(l <= m && m <= u);
        assert!((m - sma[i].unwrap()).abs() < 1e-9);
    }
}

// ============================================================
// add_returns
// ============================================================

#[test]
fn add_returns_drops_first_row_only() {
    let mut s = rising(10, 30);
    add_returns(&mut s).unwrap();
    assert_eq!(s.len(), 19);
    assert_eq!(s.missing_count(RETURN), Some(0));
    let first = s.column(RETURN).unwrap()[0].unwrap();
    assert!((first - (11.0 / 10.0 - 1.0)).abs() < 1e-12);
}

#[test]
fn add_returns_twice_is_rejected() {
    let mut s = rising(10, 30);
    add_returns(&mut s).unwrap();
    assert!(matches!(
        add_returns(&mut s),
        Err(AnalysisError::ReturnsAlreadyAdded)
    ));
    assert_eq!(s.len(), 19);
}

#[test]
fn analyzer_chains_indicators_then_returns() {
    let mut analyzer = StockAnalyzer::from_series(rising(1, 101));
    analyzer.add_indicators(&IndicatorConfig::default()).unwrap();
    analyzer.add_returns().unwrap();
    assert_eq!(analyzer.ticker, "MOCK");
    assert_eq!(analyzer.series.len(), 100 - 49 - 1);
    assert_eq!(analyzer.series.missing_count(RETURN), Some(0));
}

#[test]
fn analyzer_keeps_series_on_failure() {
    let mut analyzer = StockAnalyzer::from_series(rising(1, 11));
    assert!(analyzer.add_indicators(&IndicatorConfig::default()).is_err());
    assert_eq!(analyzer.series.len(), 10);
}
