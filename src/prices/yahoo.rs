// Chart API price source: unauthenticated JSON over HTTP.
//
// Returns OHLCV columns keyed by (field, ticker), the same shape a
// multi-instrument download produces. The loader flattens them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::source::{
    ColumnKey, LoadOptions, PriceSource, RawCell, RawColumn, RawPriceTable, RawStamp,
};

/// Default chart API endpoint.
pub const DEFAULT_PRICE_API_URL: &str = "https://query1.finance.yahoo.com";

/// Thin reqwest wrapper around the v8 chart endpoint.
pub struct YahooChartSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartSource {
    /// Create a new chart client pointing at the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; tickertape/0.1)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query string for the requested range. With neither bound the full
    /// history is requested; a missing start means the epoch and a missing
    /// end means now.
    fn range_params(options: &LoadOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![("interval", options.interval.as_query_str().to_string())];
        if options.start.is_none() && options.end.is_none() {
            params.push(("range", "max".to_string()));
        } else {
            let start = options.start.map(day_start_timestamp).unwrap_or(0);
            let end = options
                .end
                .map(day_end_timestamp)
                .unwrap_or_else(|| Utc::now().timestamp());
            params.push(("period1", start.to_string()));
            params.push(("period2", end.to_string()));
        }
        params.push(("includeAdjustedClose", "true".to_string()));
        params
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    async fn fetch(&self, ticker: &str, options: &LoadOptions) -> Result<RawPriceTable> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let params = Self::range_params(options);

        debug!(ticker = ticker, interval = %options.interval, "Chart API request");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("Chart request failed for {ticker}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chart API returned {status} for {ticker}: {body}");
        }

        let chart: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse chart response for {ticker}"))?;

        chart_to_table(ticker, chart)
    }
}

/// Convert a decoded chart response into a raw table.
fn chart_to_table(ticker: &str, chart: ChartResponse) -> Result<RawPriceTable> {
    if let Some(err) = chart.chart.error {
        anyhow::bail!("Chart API error [{}]: {}", err.code, err.description);
    }

    let data = chart
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| anyhow::anyhow!("Chart API returned no result for {ticker}"))?;

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let index: Vec<RawStamp> = timestamps
        .iter()
        .map(|ts| RawStamp::Unix(ts + offset))
        .collect();

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let nested = |field: &str, cells: Vec<Option<f64>>| RawColumn {
        key: ColumnKey::Nested {
            field: field.to_string(),
            instrument: ticker.to_string(),
        },
        cells: pad_cells(cells, index.len()),
    };

    let mut columns = vec![
        nested("Open", quote.open),
        nested("High", quote.high),
        nested("Low", quote.low),
        nested("Close", quote.close),
        nested("Volume", quote.volume),
    ];
    if let Some(adj) = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
    {
        columns.push(nested("Adj Close", adj.adjclose));
    }

    Ok(RawPriceTable { index, columns })
}

/// Chart arrays can be shorter than the timestamp list on partial days.
fn pad_cells(cells: Vec<Option<f64>>, len: usize) -> Vec<RawCell> {
    let mut out: Vec<RawCell> = cells.into_iter().take(len).map(RawCell::from).collect();
    out.resize(len, RawCell::Missing);
    out
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn day_end_timestamp(date: NaiveDate) -> i64 {
    day_start_timestamp(date) + 86_400
}

// -- Serde types for the v8 chart endpoint --

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteArrays>,
    adjclose: Option<Vec<AdjCloseArray>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteArrays {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseArray {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"gmtoffset": -18000},
                "timestamp": [1730467800, 1730727000],
                "indicators": {
                    "quote": [{
                        "open": [222.0, 220.5],
                        "high": [225.3, 221.1],
                        "low": [220.0, 219.0],
                        "close": [222.9, null],
                        "volume": [65000000, 44000000]
                    }],
                    "adjclose": [{"adjclose": [222.4]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_response_becomes_nested_table() {
        let chart: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let table = chart_to_table("AAPL", chart).unwrap();

        assert_eq!(table.index, vec![
            RawStamp::Unix(1730467800 - 18000),
            RawStamp::Unix(1730727000 - 18000),
        ]);
        assert_eq!(table.columns.len(), 6);
        assert_eq!(
            table.columns[3].key,
            ColumnKey::Nested {
                field: "Close".to_string(),
                instrument: "AAPL".to_string()
            }
        );
        assert_eq!(table.columns[3].cells[1], RawCell::Missing);
        // Short adjclose array is padded to the index length
        assert_eq!(table.columns[5].cells.len(), 2);
    }

    #[test]
    fn chart_error_is_reported() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let chart: ChartResponse = serde_json::from_str(body).unwrap();
        let err = chart_to_table("ZZZZ", chart).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn range_params_without_start_requests_full_history() {
        let params = YahooChartSource::range_params(&LoadOptions::default());
        assert!(params.contains(&("range", "max".to_string())));
        assert!(params.contains(&("interval", "1d".to_string())));
    }

    #[test]
    fn range_params_with_only_end_bounds_the_query() {
        let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let params = YahooChartSource::range_params(&LoadOptions {
            end: Some(end),
            ..LoadOptions::default()
        });
        assert!(!params.iter().any(|(k, _)| *k == "range"));
        assert!(params.contains(&("period1", "0".to_string())));
        assert!(params.contains(&("period2", day_end_timestamp(end).to_string())));
    }
}
