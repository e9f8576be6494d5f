//! Drawdown profiles.
//!
//! Drawdown is measured against a running peak that starts at the first
//! observation, so every profile begins at zero.

use crate::series::TimeSeries;
use crate::types::{DrawdownPoint, DrawdownResult, DrawdownSummary};
use crate::{Error, Result};

/// Default number of observations per window for windowed drawdown.
pub const DEFAULT_DRAWDOWN_WINDOW: usize = 60;

/// Calculate drawdown, running max drawdown and running average drawdown for
/// every date of `series`.
///
/// # Arguments
///
/// * `series` - Strictly positive values (prices or portfolio values) in date order
///
/// # Returns
///
/// One [`DrawdownPoint`] per observation. An empty series yields an empty
/// result; a non-positive or non-finite value is rejected since drawdown is
/// undefined against a zero or infinite peak.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use pfstats_core::analytics::compute_drawdown;
/// use pfstats_core::series::TimeSeries;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let series = TimeSeries::from_business_days(start, &[100.0, 90.0, 95.0]).unwrap();
/// let result = compute_drawdown(&series).unwrap();
///
/// // Peak 100, trough 90
/// assert!((result.max_drawdown().unwrap() - 0.1).abs() < 1e-12);
/// ```
pub fn compute_drawdown(series: &TimeSeries) -> Result<DrawdownResult> {
    let Some(first) = series.first() else {
        return Ok(DrawdownResult::default());
    };

    let mut points = Vec::with_capacity(series.len());
    let mut peak = first.value;
    let mut max_drawdown = 0.0_f64;
    let mut drawdown_sum = 0.0;

    for (i, obs) in series.iter().enumerate() {
        if !obs.value.is_finite() || obs.value <= 0.0 {
            tracing::warn!(date = %obs.date, value = obs.value, "non-positive or non-finite value in drawdown input");
            return Err(Error::InvalidArgument(format!(
                "drawdown requires finite positive values, got {} on {}",
                obs.value, obs.date
            )));
        }

        peak = peak.max(obs.value);
        let drawdown = (peak - obs.value) / peak;
        max_drawdown = max_drawdown.max(drawdown);
        drawdown_sum += drawdown;

        points.push(DrawdownPoint {
            date: obs.date,
            drawdown,
            max_drawdown,
            avg_drawdown: drawdown_sum / (i + 1) as f64,
        });
    }

    Ok(DrawdownResult::new(points))
}

/// Calculate drawdown summaries over fixed-size windows.
///
/// The series is split into contiguous, non-overlapping windows of
/// `window_size` observations (the last may be shorter). Each window is run
/// through [`compute_drawdown`] on its own, with its peak reset to its own
/// first value, and contributes its final max and average drawdown.
pub fn compute_windowed_drawdown(
    series: &TimeSeries,
    window_size: usize,
) -> Result<Vec<DrawdownSummary>> {
    if window_size == 0 {
        return Err(Error::InvalidArgument(
            "drawdown window size must be at least 1".to_string(),
        ));
    }

    let mut summaries = Vec::new();
    for window in series.chunks(window_size)? {
        let profile = compute_drawdown(&window)?;
        let (Some(first), Some(last)) = (window.first(), profile.last()) else {
            continue;
        };

        summaries.push(DrawdownSummary {
            start: first.date,
            end: last.date,
            observations: window.len(),
            max_drawdown: last.max_drawdown,
            avg_drawdown: last.avg_drawdown,
        });
    }

    tracing::debug!(
        observations = series.len(),
        window_size,
        windows = summaries.len(),
        "windowed drawdown computed"
    );

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TimeSeries::from_business_days(start, values).unwrap()
    }

    #[test]
    fn test_drawdown_sequence() {
        let result = compute_drawdown(&series(&[100.0, 90.0, 95.0, 80.0, 120.0])).unwrap();

        let dd: Vec<f64> = result.points().iter().map(|p| p.drawdown).collect();
        let mdd: Vec<f64> = result.points().iter().map(|p| p.max_drawdown).collect();

        let expected_dd = [0.0, 0.1, 0.05, 0.2, 0.0];
        let expected_mdd = [0.0, 0.1, 0.1, 0.2, 0.2];
        for i in 0..5 {
            assert_relative_eq!(dd[i], expected_dd[i], epsilon = 1e-12);
            assert_relative_eq!(mdd[i], expected_mdd[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_average_drawdown_is_expanding_mean() {
        let result = compute_drawdown(&series(&[100.0, 90.0, 95.0, 80.0, 120.0])).unwrap();

        // (0 + 0.1 + 0.05 + 0.2 + 0) / 5
        assert_relative_eq!(result.avg_drawdown().unwrap(), 0.07, epsilon = 1e-12);
        // (0 + 0.1) / 2
        assert_relative_eq!(result.points()[1].avg_drawdown, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_single_observation() {
        let result = compute_drawdown(&series(&[42.0])).unwrap();

        assert_eq!(result.len(), 1);
        let point = result.points()[0];
        assert_eq!(point.drawdown, 0.0);
        assert_eq!(point.max_drawdown, 0.0);
        assert_eq!(point.avg_drawdown, 0.0);
    }

    #[test]
    fn test_empty_series() {
        let result = compute_drawdown(&TimeSeries::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.max_drawdown(), None);
    }

    #[test]
    fn test_rising_series_has_no_drawdown() {
        let result = compute_drawdown(&series(&[10.0, 10.0, 11.0, 12.5, 13.0])).unwrap();
        assert!(result.points().iter().all(|p| p.drawdown == 0.0));
        assert_eq!(result.max_drawdown(), Some(0.0));
    }

    #[test]
    fn test_non_positive_value_rejected() {
        let result = compute_drawdown(&series(&[10.0, 0.0, 11.0]));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let result = compute_drawdown(&series(&[100.0, f64::INFINITY, 90.0]));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = compute_drawdown(&series(&[100.0, f64::NAN, 90.0]));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_windowed_drawdown_resets_per_window() {
        // Window 1: 100, 90 -> mdd 0.1, avdd 0.05
        // Window 2: 50, 100 -> peak resets to 50, no drawdown
        // Window 3: 80 -> single observation
        let summaries =
            compute_windowed_drawdown(&series(&[100.0, 90.0, 50.0, 100.0, 80.0]), 2).unwrap();

        assert_eq!(summaries.len(), 3);

        assert_relative_eq!(summaries[0].max_drawdown, 0.1, epsilon = 1e-12);
        assert_relative_eq!(summaries[0].avg_drawdown, 0.05, epsilon = 1e-12);
        assert_eq!(summaries[0].observations, 2);

        assert_eq!(summaries[1].max_drawdown, 0.0);
        assert_eq!(summaries[1].avg_drawdown, 0.0);

        assert_eq!(summaries[2].observations, 1);
        assert_eq!(summaries[2].max_drawdown, 0.0);
        assert_eq!(summaries[2].start, summaries[2].end);
    }

    #[test]
    fn test_windowed_single_window_matches_full_period() {
        let values = [100.0, 90.0, 95.0, 80.0, 120.0, 110.0];
        let full = compute_drawdown(&series(&values)).unwrap();
        let windowed = compute_windowed_drawdown(&series(&values), values.len()).unwrap();

        assert_eq!(windowed.len(), 1);
        assert_eq!(Some(windowed[0].max_drawdown), full.max_drawdown());
        assert_eq!(Some(windowed[0].avg_drawdown), full.avg_drawdown());
    }

    #[test]
    fn test_windowed_zero_size_rejected() {
        let result = compute_windowed_drawdown(&series(&[1.0, 2.0]), 0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
