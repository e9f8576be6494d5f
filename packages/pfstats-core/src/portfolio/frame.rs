//! Portfolio value series built from per-ticker close prices.

use super::spec::PortfolioSpec;
use super::variance::{compute_portfolio_std, CorrelationMatrix};
use crate::providers::PriceSeriesProvider;
use crate::series::{business_days, pearson_correlation, sample_std_dev, Observation, TimeSeries};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading days per year used to annualize daily asset volatility.
pub const DEFAULT_ASSET_PERIODS_PER_YEAR: f64 = 252.0;

/// Per-asset inputs to the portfolio volatility calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRisk {
    /// Tickers, in spec order
    pub tickers: Vec<String>,
    /// Target weights
    pub weights: Vec<f64>,
    /// Annualized standard deviation of daily returns
    pub std_devs: Vec<f64>,
    /// Pearson correlation of daily returns
    pub correlations: CorrelationMatrix,
}

/// Aligned price, return and value columns for one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioFrame {
    /// The portfolio the frame was built for
    pub spec: PortfolioSpec,
    /// Starting value of the portfolio
    pub base_value: f64,
    /// Close prices per ticker on the business-day index, in spec order
    pub closes: Vec<TimeSeries>,
    /// Fractional daily returns per ticker, first element 0
    pub asset_returns: Vec<TimeSeries>,
    /// Weighted sum of asset returns
    pub portfolio_returns: TimeSeries,
    /// Running product of (1 + portfolio return)
    pub cumulative_returns: TimeSeries,
    /// `base_value * cumulative_returns`
    pub values: TimeSeries,
}

/// Build the portfolio frame for `spec` over the business days in
/// `[start, end)`.
///
/// Each ticker's closes are aligned onto the business-day index: days without
/// a quote take the previous close, and a missing start is back-filled from
/// the first available close. Unallocated weight is held as cash and does not
/// move.
pub fn build_portfolio_frame<P>(
    spec: &PortfolioSpec,
    provider: &P,
    start: NaiveDate,
    end: NaiveDate,
    base_value: f64,
) -> Result<PortfolioFrame>
where
    P: PriceSeriesProvider + ?Sized,
{
    if base_value.is_nan() || base_value <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "base value must be positive, got {}",
            base_value
        )));
    }

    let dates = business_days(start, end);
    if dates.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "no business days between {} and {}",
            start, end
        )));
    }

    let mut closes = Vec::with_capacity(spec.len());
    let mut asset_returns = Vec::with_capacity(spec.len());
    for ticker in spec.tickers() {
        let prices = provider.get_prices(ticker, start, end)?;
        let aligned = prices.reindex_fill(&dates).map_err(|_| {
            Error::InsufficientData(format!(
                "no prices for {} between {} and {}",
                ticker, start, end
            ))
        })?;
        asset_returns.push(aligned.pct_change());
        closes.push(aligned);
    }

    let weights = spec.weights();
    let mut portfolio = Vec::with_capacity(dates.len());
    let mut cumulative = Vec::with_capacity(dates.len());
    let mut values = Vec::with_capacity(dates.len());
    let mut growth = 1.0;

    for (idx, date) in dates.iter().enumerate() {
        let r: f64 = asset_returns
            .iter()
            .zip(&weights)
            .map(|(returns, w)| returns.observations()[idx].value * w)
            .sum();
        growth *= 1.0 + r;

        portfolio.push(Observation::new(*date, r));
        cumulative.push(Observation::new(*date, growth));
        values.push(Observation::new(*date, base_value * growth));
    }

    tracing::debug!(
        tickers = spec.len(),
        days = dates.len(),
        final_value = base_value * growth,
        "portfolio frame built"
    );

    Ok(PortfolioFrame {
        spec: spec.clone(),
        base_value,
        closes,
        asset_returns,
        portfolio_returns: TimeSeries::new(portfolio)?,
        cumulative_returns: TimeSeries::new(cumulative)?,
        values: TimeSeries::new(values)?,
    })
}

impl PortfolioFrame {
    /// Business-day index of the frame.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.values.dates()
    }

    /// Close prices for `ticker` (case-insensitive).
    pub fn closes_for(&self, ticker: &str) -> Option<&TimeSeries> {
        self.ticker_index(ticker).map(|idx| &self.closes[idx])
    }

    /// Daily returns for `ticker` (case-insensitive).
    pub fn returns_for(&self, ticker: &str) -> Option<&TimeSeries> {
        self.ticker_index(ticker).map(|idx| &self.asset_returns[idx])
    }

    fn ticker_index(&self, ticker: &str) -> Option<usize> {
        let ticker = ticker.to_uppercase();
        self.spec.tickers().iter().position(|t| *t == ticker)
    }

    /// Annualized volatilities and return correlations of the assets with a
    /// positive weight.
    ///
    /// Volatility is the sample standard deviation of daily returns (anchor
    /// included) scaled by `sqrt(periods_per_year)`. A pair involving a
    /// constant-price asset has no defined correlation and is treated as
    /// uncorrelated; its covariance is zero either way.
    pub fn asset_risk(&self, periods_per_year: f64) -> Result<AssetRisk> {
        let active = self.spec.active()?;

        let mut tickers = Vec::with_capacity(active.len());
        let mut returns = Vec::with_capacity(active.len());
        for ticker in active.tickers() {
            let series = self.returns_for(ticker).ok_or_else(|| {
                Error::InvalidArgument(format!("{} is not part of this portfolio", ticker))
            })?;
            tickers.push(ticker.to_string());
            returns.push(series.values());
        }

        let std_devs = returns
            .iter()
            .zip(&tickers)
            .map(|(r, ticker)| {
                sample_std_dev(r)
                    .map(|std| std * periods_per_year.sqrt())
                    .ok_or_else(|| {
                        Error::InsufficientData(format!(
                            "need at least 2 observations to estimate volatility of {}",
                            ticker
                        ))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        let n = returns.len();
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            rows[i][i] = 1.0;
            for j in (i + 1)..n {
                let rho = pearson_correlation(&returns[i], &returns[j]).unwrap_or(0.0);
                rows[i][j] = rho;
                rows[j][i] = rho;
            }
        }

        Ok(AssetRisk {
            tickers,
            weights: active.weights(),
            std_devs,
            correlations: CorrelationMatrix::new(rows)?,
        })
    }

    /// Annualized portfolio standard deviation from [`PortfolioFrame::asset_risk`].
    pub fn portfolio_std(&self, periods_per_year: f64) -> Result<f64> {
        let risk = self.asset_risk(periods_per_year)?;
        compute_portfolio_std(&risk.weights, &risk.std_devs, &risk.correlations)
    }
}
