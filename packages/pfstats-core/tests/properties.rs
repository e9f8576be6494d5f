//! Cross-module behaviour of the analytics on realistic series.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use pfstats_core::analytics::{
    compute_drawdown, compute_sharpe, compute_sharpe_between, compute_stats_with,
    compute_windowed_drawdown,
};
use pfstats_core::portfolio::{
    build_portfolio_frame, compute_portfolio_std, CorrelationMatrix, PortfolioSpec,
    DEFAULT_ASSET_PERIODS_PER_YEAR,
};
use pfstats_core::series::{mean, sample_std_dev};
use pfstats_core::{
    Error, SharpeMode, SharpeResult, StaticPriceSource, StaticRateSource, TimeSeries,
};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Deterministic wavy price path with drift, always positive.
fn wavy_prices(n: usize, seed: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 * (1.0 + 0.0004 * t) + 6.0 * (t * 0.37 + seed).sin() + 2.5 * (t * 1.9 + seed).cos()
        })
        .collect()
}

/// Price path compounding the given percent returns from 100.
fn prices_from_returns(returns: &[f64]) -> Vec<f64> {
    let mut value = 100.0;
    std::iter::once(value)
        .chain(returns.iter().map(|r| {
            value *= 1.0 + r / 100.0;
            value
        }))
        .collect()
}

fn positive_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1.0e6, 1..250)
}

proptest! {
    #[test]
    fn drawdown_is_zero_for_non_decreasing_series(
        start in 0.01f64..1.0e4,
        steps in prop::collection::vec(0.0f64..50.0, 0..250),
    ) {
        let mut value = start;
        let values: Vec<f64> = std::iter::once(start)
            .chain(steps.iter().map(|step| {
                value += step;
                value
            }))
            .collect();
        let series = TimeSeries::from_business_days(date(2023, 1, 2), &values).unwrap();

        let result = compute_drawdown(&series).unwrap();
        prop_assert!(result.points().iter().all(|p| p.drawdown == 0.0));
        prop_assert_eq!(result.max_drawdown(), Some(0.0));
    }

    #[test]
    fn max_drawdown_is_monotone_and_bounded(values in positive_prices()) {
        let series = TimeSeries::from_business_days(date(2023, 1, 2), &values).unwrap();
        let result = compute_drawdown(&series).unwrap();

        let mut prev = 0.0;
        for point in result.points() {
            prop_assert!(point.max_drawdown >= prev);
            prop_assert!(point.max_drawdown < 1.0);
            prop_assert!(point.drawdown >= 0.0 && point.drawdown <= point.max_drawdown);
            prev = point.max_drawdown;
        }
    }

    #[test]
    fn average_drawdown_equals_mean_of_prefix(values in positive_prices()) {
        let series = TimeSeries::from_business_days(date(2023, 1, 2), &values).unwrap();
        let result = compute_drawdown(&series).unwrap();

        let mut sum = 0.0;
        for (i, point) in result.points().iter().enumerate() {
            sum += point.drawdown;
            prop_assert_eq!(point.avg_drawdown, sum / (i + 1) as f64);
        }
    }
}

#[test]
fn wavy_path_has_a_drawdown() {
    let series = TimeSeries::from_business_days(date(2023, 1, 2), &wavy_prices(300, 0.4)).unwrap();
    let result = compute_drawdown(&series).unwrap();
    assert!(result.max_drawdown().unwrap() > 0.0);
}

#[test]
fn single_window_matches_full_period_final_row() {
    let values = wavy_prices(90, 2.1);
    let series = TimeSeries::from_business_days(date(2023, 1, 2), &values).unwrap();

    let full = compute_drawdown(&series).unwrap();
    let windows = compute_windowed_drawdown(&series, values.len()).unwrap();

    assert_eq!(windows.len(), 1);
    let last = full.last().unwrap();
    assert_eq!(windows[0].max_drawdown, last.max_drawdown);
    assert_eq!(windows[0].avg_drawdown, last.avg_drawdown);
}

#[test]
fn windows_do_not_carry_state_across_boundaries() {
    let values = wavy_prices(130, 0.9);
    let series = TimeSeries::from_business_days(date(2023, 1, 2), &values).unwrap();

    let windows = compute_windowed_drawdown(&series, 60).unwrap();
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[2].observations, 10);

    for (summary, chunk) in windows.iter().zip(series.chunks(60).unwrap()) {
        let own = compute_drawdown(&chunk).unwrap();
        assert_eq!(Some(summary.max_drawdown), own.max_drawdown());
        assert_eq!(Some(summary.avg_drawdown), own.avg_drawdown());
    }
}

#[test]
fn drawdown_scenario() {
    let series =
        TimeSeries::from_business_days(date(2024, 3, 4), &[100.0, 90.0, 95.0, 80.0, 120.0]).unwrap();
    let result = compute_drawdown(&series).unwrap();

    let expected_dd = [0.0, 0.1, 0.05, 0.2, 0.0];
    let expected_mdd = [0.0, 0.1, 0.1, 0.2, 0.2];
    for (point, (dd, mdd)) in result.points().iter().zip(expected_dd.iter().zip(expected_mdd)) {
        assert_relative_eq!(point.drawdown, *dd, epsilon = 1e-12);
        assert_relative_eq!(point.max_drawdown, mdd, epsilon = 1e-12);
    }
}

#[test]
fn full_period_sharpe_scenario_with_zero_rate() {
    let series =
        TimeSeries::from_business_days(date(2024, 3, 4), &[1000.0, 1100.0, 1050.0, 1200.0])
            .unwrap();
    let rates = series.map_values(|_| 0.0);

    let sharpe = compute_sharpe(&series, &rates, SharpeMode::FullPeriod)
        .unwrap()
        .as_scalar()
        .unwrap();

    // Anchor dropped: 10, -4.545..., 14.285...
    let returns = [10.0, -100.0 / 22.0, 100.0 / 7.0];
    let expected = mean(&returns).unwrap() / sample_std_dev(&returns).unwrap() * 365.0_f64.sqrt();
    assert_relative_eq!(sharpe, expected, epsilon = 1e-9);
}

#[test]
fn sharpe_depends_on_excess_return_only() {
    let series = TimeSeries::from_business_days(date(2023, 1, 2), &wavy_prices(200, 0.2)).unwrap();
    let base_rates = series.map_values(|_| 2.0);
    let shifted_rates = series.map_values(|_| 2.0 + 36.5);

    let base = compute_sharpe(&series, &base_rates, SharpeMode::FullPeriod)
        .unwrap()
        .as_scalar()
        .unwrap();
    let shifted = compute_sharpe(&series, &shifted_rates, SharpeMode::FullPeriod)
        .unwrap()
        .as_scalar()
        .unwrap();

    // Raising the rate alone lowers the ratio ...
    assert!(shifted < base);

    // ... by exactly the daily shift (0.1 points) over the unchanged volatility.
    let returns = series.pct_change_percent().skip_first().values();
    let std = sample_std_dev(&returns).unwrap();
    assert_relative_eq!(base - shifted, 0.1 / std * 365.0_f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn sharpe_is_unchanged_when_returns_and_rate_shift_together() {
    let returns: Vec<f64> = (0..120)
        .map(|i| 0.05 + 1.2 * (i as f64 * 0.61).sin())
        .collect();
    // 0.02 points per day on the returns, 365 * 0.02 = 7.3 points per year on the rate
    let shifted_returns: Vec<f64> = returns.iter().map(|r| r + 0.02).collect();

    let series =
        TimeSeries::from_business_days(date(2023, 1, 2), &prices_from_returns(&returns)).unwrap();
    let shifted_series =
        TimeSeries::from_business_days(date(2023, 1, 2), &prices_from_returns(&shifted_returns))
            .unwrap();
    let rates = series.map_values(|_| 2.0);
    let shifted_rates = series.map_values(|_| 2.0 + 7.3);

    let base = compute_sharpe(&series, &rates, SharpeMode::FullPeriod)
        .unwrap()
        .as_scalar()
        .unwrap();
    let shifted = compute_sharpe(&shifted_series, &shifted_rates, SharpeMode::FullPeriod)
        .unwrap()
        .as_scalar()
        .unwrap();

    assert_relative_eq!(base, shifted, max_relative = 1e-9);
}

#[test]
fn yearly_sharpe_produces_one_bucket_per_year() {
    let start = date(2022, 11, 1);
    let series = TimeSeries::from_business_days(start, &wavy_prices(320, 3.3)).unwrap();
    let rates = StaticRateSource::constant(date(2022, 1, 1), date(2024, 12, 31), 3.0);

    let result =
        compute_sharpe_between(&series, &rates, start, date(2024, 12, 31), SharpeMode::Yearly)
            .unwrap();

    let periods = result.as_periodic().unwrap();
    let ends: Vec<NaiveDate> = periods.iter().map(|p| p.period_end).collect();
    assert_eq!(ends, vec![date(2022, 12, 31), date(2023, 12, 31), date(2024, 12, 31)]);

    let total: usize = periods.iter().map(|p| p.observations).sum();
    assert_eq!(total, series.len() - 1);
    assert!(periods.iter().all(|p| p.sharpe.is_some()));
}

#[test]
fn monthly_sharpe_covers_every_month() {
    let series = TimeSeries::from_business_days(date(2024, 1, 1), &wavy_prices(135, 0.7)).unwrap();
    let rates = series.map_values(|_| 4.5);

    let result = compute_sharpe(&series, &rates, SharpeMode::Monthly).unwrap();
    let SharpeResult::Periodic(periods) = result else {
        panic!("expected periodic result");
    };

    // 135 business days from 2024-01-01 run into early July
    assert_eq!(periods.first().unwrap().period_end, date(2024, 1, 31));
    assert_eq!(periods.len(), 7);
    assert!(periods.windows(2).all(|w| w[0].period_end < w[1].period_end));
}

#[test]
fn unsupported_mode_is_rejected_before_computing() {
    assert!(matches!("weekly".parse::<SharpeMode>(), Err(Error::InvalidArgument(_))));
}

#[test]
fn portfolio_std_properties() {
    // Single asset: its own volatility
    let single = compute_portfolio_std(&[1.0], &[0.27], &CorrelationMatrix::new(vec![vec![1.0]]).unwrap())
        .unwrap();
    assert_relative_eq!(single, 0.27, epsilon = 1e-15);

    // Two uncorrelated equal assets: sigma / sqrt(2)
    let uncorrelated =
        compute_portfolio_std(&[0.5, 0.5], &[0.3, 0.3], &CorrelationMatrix::identity(2)).unwrap();
    assert_relative_eq!(uncorrelated, 0.3 / 2.0_f64.sqrt(), epsilon = 1e-15);

    // Perfectly correlated: no diversification benefit
    let correlated = compute_portfolio_std(
        &[0.5, 0.5],
        &[0.2, 0.2],
        &CorrelationMatrix::new(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap(),
    )
    .unwrap();
    assert_relative_eq!(correlated, 0.2, epsilon = 1e-15);
}

#[test]
fn portfolio_pipeline_end_to_end() {
    let start = date(2024, 1, 1);
    let end = date(2024, 7, 1);

    let prices = StaticPriceSource::new()
        .with_series("SPY", TimeSeries::from_business_days(start, &wavy_prices(140, 0.1)).unwrap())
        .with_series("GLD", TimeSeries::from_business_days(start, &wavy_prices(140, 2.0)).unwrap())
        .with_series("SHY", TimeSeries::from_business_days(start, &wavy_prices(140, 4.0)).unwrap());
    let spec: PortfolioSpec = "SPY=0.4,GLD=0.3,SHY=0.2".parse().unwrap();

    let frame = build_portfolio_frame(&spec, &prices, start, end, 1000.0).unwrap();
    assert_eq!(frame.values.first().unwrap().value, 1000.0);
    assert_relative_eq!(spec.cash_weight(), 0.1, epsilon = 1e-12);

    let std = frame.portfolio_std(DEFAULT_ASSET_PERIODS_PER_YEAR).unwrap();
    assert!(std > 0.0 && std.is_finite());

    let rates = StaticRateSource::constant(date(2023, 12, 1), date(2024, 12, 31), 4.2);
    let record = compute_stats_with(&frame.values, &rates, "pf_val", 1000.0).unwrap();

    assert_eq!(record.raw_value, frame.values.last().unwrap().value);
    assert_relative_eq!(record.return_since_base, record.raw_value / 1000.0 - 1.0);
    assert!(record.sharpe.is_some());
    assert!(record.max_drawdown > 0.0 && record.max_drawdown < 1.0);

    let keyed = record.to_keyed_map();
    assert_eq!(keyed.len(), 4);
    assert!(keyed.contains_key("pf_val_mdd"));
}

#[test]
fn overweight_portfolio_is_rejected() {
    let result = "SPY=0.6,GLD=0.6".parse::<PortfolioSpec>();
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}
