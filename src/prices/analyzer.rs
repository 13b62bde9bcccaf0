// StockAnalyzer: one ticker's series moving through the price pipeline.

use crate::error::Result;
use crate::indicators::engine::{add_indicators, IndicatorConfig};
use crate::indicators::returns::add_returns;

use super::loader::load_price;
use super::series::PriceSeries;
use super::source::{LoadOptions, PriceSource};

/// Owns a ticker's price series and appends derived columns to it.
pub struct StockAnalyzer {
    pub ticker: String,
    pub series: PriceSeries,
}

impl StockAnalyzer {
    /// Fetch prices for `ticker` from `source`.
    pub async fn load(
        source: &dyn PriceSource,
        ticker: &str,
        options: &LoadOptions,
    ) -> Result<Self> {
        let series = load_price(source, ticker, options).await?;
        Ok(Self {
            ticker: ticker.to_string(),
            series,
        })
    }

    /// Wrap an already-built series (offline data, tests).
    pub fn from_series(series: PriceSeries) -> Self {
        Self {
            ticker: series.ticker().to_string(),
            series,
        }
    }

    /// Replace the series with one carrying the indicator columns.
    /// On error the series is left as it was.
    pub fn add_indicators(&mut self, config: &IndicatorConfig) -> Result<()> {
        self.series = add_indicators(&self.series, config)?;
        Ok(())
    }

    pub fn add_returns(&mut self) -> Result<()> {
        add_returns(&mut self.series)
    }
}
