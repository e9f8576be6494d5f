//! Summary statistics for a named value series.

use super::{compute_drawdown, compute_sharpe};
use crate::providers::RiskFreeRateProvider;
use crate::series::TimeSeries;
use crate::types::{PerformanceRecord, SharpeMode};
use crate::{Error, Result};

/// Default starting value a portfolio series is measured against.
pub const DEFAULT_BASE_VALUE: f64 = 1000.0;

/// Build the performance record for `series`.
///
/// # Arguments
///
/// * `series` - Portfolio or asset values in date order
/// * `risk_free` - Annual risk-free rate in percent covering the series' span
/// * `name` - Column name the record is keyed by
/// * `base_value` - Starting value the return is measured from
///
/// # Returns
///
/// The last value, return since `base_value`, full-period Sharpe ratio and
/// full-period maximum drawdown.
pub fn compute_stats(
    series: &TimeSeries,
    risk_free: &TimeSeries,
    name: &str,
    base_value: f64,
) -> Result<PerformanceRecord> {
    let Some(last) = series.last() else {
        return Err(Error::InsufficientData(format!(
            "series '{}' has no observations",
            name
        )));
    };

    if base_value.is_nan() || base_value <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "base value must be positive, got {}",
            base_value
        )));
    }

    let sharpe = compute_sharpe(series, risk_free, SharpeMode::FullPeriod)?.as_scalar();
    let max_drawdown = compute_drawdown(series)?.max_drawdown().unwrap_or(0.0);

    Ok(PerformanceRecord {
        name: name.to_string(),
        raw_value: last.value,
        return_since_base: last.value / base_value - 1.0,
        sharpe,
        max_drawdown,
    })
}

/// Build the performance record for `series`, fetching the risk-free rate for
/// the series' own date span from `provider`.
pub fn compute_stats_with<P>(
    series: &TimeSeries,
    provider: &P,
    name: &str,
    base_value: f64,
) -> Result<PerformanceRecord>
where
    P: RiskFreeRateProvider + ?Sized,
{
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(Error::InsufficientData(format!(
            "series '{}' has no observations",
            name
        )));
    };

    let risk_free = provider.get_risk_free_rate(first.date, last.date)?;
    compute_stats(series, &risk_free, name, base_value)
}
