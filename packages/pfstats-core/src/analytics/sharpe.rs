//! Annualized Sharpe ratio, over a whole range or per calendar bucket.
//!
//! Returns and risk-free rates are both expressed in percentage points
//! (a 1.5% daily move is `1.5`, a 4.2% annual yield is `4.2`).

use crate::providers::RiskFreeRateProvider;
use crate::series::{mean, sample_std_dev, Period, TimeSeries};
use crate::types::{PeriodSharpe, SharpeMode, SharpeResult};
use crate::Result;
use chrono::NaiveDate;

/// Calendar days per year used to de-annualize the risk-free rate and to
/// annualize the full-period ratio.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Calculate the Sharpe ratio of a value series against a risk-free series.
///
/// # Arguments
///
/// * `values` - Prices or portfolio values in date order
/// * `risk_free` - Annual risk-free rate in percent; projected onto the value
///   dates with forward-fill then back-fill
/// * `mode` - Full period, or one ratio per month / year
///
/// # Returns
///
/// A [`SharpeResult`]. Undefined ratios (fewer than two returns, zero
/// volatility) are reported as `None` rather than failing the call.
pub fn compute_sharpe(
    values: &TimeSeries,
    risk_free: &TimeSeries,
    mode: SharpeMode,
) -> Result<SharpeResult> {
    let rates = risk_free.reindex_fill(&values.dates())?.skip_first();
    // The first percent change is only the anchor, not an observed return.
    let returns = values.pct_change_percent().skip_first();

    let result = match mode.period() {
        None => SharpeResult::FullPeriod(full_period_sharpe(&returns, &rates)),
        Some(period) => SharpeResult::Periodic(periodic_sharpe(&returns, &rates, period)),
    };

    tracing::debug!(%mode, returns = returns.len(), "sharpe ratio computed");

    Ok(result)
}

/// Calculate the Sharpe ratio over `[start, end]`, fetching the risk-free
/// rate for that window from `provider`.
pub fn compute_sharpe_between<P>(
    values: &TimeSeries,
    provider: &P,
    start: NaiveDate,
    end: NaiveDate,
    mode: SharpeMode,
) -> Result<SharpeResult>
where
    P: RiskFreeRateProvider + ?Sized,
{
    let window = values.between(start, end);
    let risk_free = provider.get_risk_free_rate(start, end)?;
    compute_sharpe(&window, &risk_free, mode)
}

fn full_period_sharpe(returns: &TimeSeries, rates: &TimeSeries) -> Option<f64> {
    let excess: Vec<f64> = returns
        .iter()
        .zip(rates)
        .map(|(r, rf)| r.value - rf.value / DAYS_PER_YEAR)
        .collect();

    let std = volatility(&excess)?;
    let sharpe = mean(&excess)? / std * DAYS_PER_YEAR.sqrt();

    sharpe.is_finite().then_some(sharpe)
}

fn periodic_sharpe(returns: &TimeSeries, rates: &TimeSeries, period: Period) -> Vec<PeriodSharpe> {
    let mut buckets: Vec<PeriodSharpe> = Vec::new();
    let observations = returns.observations();
    let rate_values = rates.values();

    let mut start = 0;
    while start < observations.len() {
        let period_end = period.period_end(observations[start].date);
        let len = observations[start..]
            .iter()
            .take_while(|o| period.period_end(o.date) == period_end)
            .count();
        let end = start + len;

        let bucket: Vec<f64> = observations[start..end].iter().map(|o| o.value).collect();
        let risk_free = rate_values[end - 1] / period.periods_per_year();
        let sharpe = bucket_sharpe(&bucket, risk_free);

        if sharpe.is_none() {
            tracing::debug!(%period_end, observations = len, "sharpe undefined for bucket");
        }

        buckets.push(PeriodSharpe {
            period_end,
            observations: len,
            sharpe,
        });
        start = end;
    }

    buckets
}

/// Compounded bucket return in excess of the bucket's risk-free rate, scaled
/// by the bucket's daily volatility grown over its length.
fn bucket_sharpe(returns: &[f64], risk_free: f64) -> Option<f64> {
    let std = volatility(returns)?;
    let growth: f64 = returns.iter().map(|r| 1.0 + r / 100.0).product();
    let compound_return = 100.0 * (growth - 1.0);

    let sharpe = (compound_return - risk_free) / (std * (returns.len() as f64).sqrt());
    sharpe.is_finite().then_some(sharpe)
}

/// Sample standard deviation, or `None` when it is zero up to rounding.
///
/// A constant series can yield a std of a few ulps instead of exactly 0.
fn volatility(values: &[f64]) -> Option<f64> {
    let std = sample_std_dev(values)?;
    let scale = mean(values)?.abs().max(1.0);
    (std > f64::EPSILON * scale).then_some(std)
}
