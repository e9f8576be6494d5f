//! Market data seams.
//!
//! The analytics never fetch data themselves. Callers plug in a
//! [`PriceSeriesProvider`] and a [`RiskFreeRateProvider`]; remote
//! implementations (and any rate limiting they need) live outside this crate.
//! The in-memory sources here serve tests, the CLI and pre-downloaded data.

use crate::series::{Observation, TimeSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Source of daily close prices.
pub trait PriceSeriesProvider {
    /// Close prices for `ticker` with `start <= date <= end`.
    fn get_prices(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries>;
}

/// Source of the annual risk-free rate, in percent.
pub trait RiskFreeRateProvider {
    /// Daily (calendar-day, forward-filled) rate with `start <= date <= end`.
    fn get_risk_free_rate(&self, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries>;
}

/// In-memory price histories keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    series: HashMap<String, TimeSeries>,
}

impl StaticPriceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from a ticker -> series map.
    pub fn from_map(series: HashMap<String, TimeSeries>) -> Self {
        let mut source = Self::new();
        for (ticker, prices) in series {
            source.insert(&ticker, prices);
        }
        source
    }

    /// Add or replace the history for `ticker` (case-insensitive).
    pub fn insert(&mut self, ticker: &str, prices: TimeSeries) {
        self.series.insert(ticker.to_uppercase(), prices);
    }

    /// Builder-style [`StaticPriceSource::insert`].
    pub fn with_series(mut self, ticker: &str, prices: TimeSeries) -> Self {
        self.insert(ticker, prices);
        self
    }

    /// Tickers with a stored history.
    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.series.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }
}

impl PriceSeriesProvider for StaticPriceSource {
    fn get_prices(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        self.series
            .get(&ticker.to_uppercase())
            .map(|prices| prices.between(start, end))
            .ok_or_else(|| Error::DataSource(format!("no price history for {}", ticker)))
    }
}

/// In-memory risk-free quotes as published (possibly sparse, with missing
/// quotes stored as NaN).
///
/// Requests are answered by resampling the quotes to calendar days and
/// forward-filling, so weekends and holidays carry the last published rate.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    quotes: TimeSeries,
}

impl StaticRateSource {
    /// Create a source from published quotes.
    pub fn new(quotes: TimeSeries) -> Self {
        Self { quotes }
    }

    /// A flat rate quoted on `start` and `end`.
    pub fn constant(start: NaiveDate, end: NaiveDate, rate: f64) -> Self {
        let mut quotes = vec![Observation::new(start, rate)];
        if end > start {
            quotes.push(Observation::new(end, rate));
        }
        Self {
            quotes: TimeSeries::new(quotes).unwrap_or_default(),
        }
    }

    /// The raw published quotes.
    pub fn quotes(&self) -> &TimeSeries {
        &self.quotes
    }
}

impl RiskFreeRateProvider for StaticRateSource {
    fn get_risk_free_rate(&self, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        let daily = self.quotes.resample_daily_ffill(start, end);
        if daily.is_empty() {
            return Err(Error::DataSource(format!(
                "no risk-free quotes between {} and {}",
                start, end
            )));
        }
        Ok(daily)
    }
}
