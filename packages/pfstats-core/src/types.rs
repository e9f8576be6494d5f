//! Core result types for pfstats analytics.

use crate::series::Period;
use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Drawdown figures for one date of a full-period drawdown run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawdownPoint {
    /// Observation date
    pub date: NaiveDate,
    /// Fractional decline from the running peak, in [0, 1]
    pub drawdown: f64,
    /// Largest drawdown seen up to and including this date
    pub max_drawdown: f64,
    /// Mean of all drawdowns up to and including this date
    pub avg_drawdown: f64,
}

/// Per-date drawdown profile of a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DrawdownResult {
    points: Vec<DrawdownPoint>,
}

impl DrawdownResult {
    pub(crate) fn new(points: Vec<DrawdownPoint>) -> Self {
        Self { points }
    }

    /// One point per input observation, in date order.
    pub fn points(&self) -> &[DrawdownPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The final point.
    pub fn last(&self) -> Option<&DrawdownPoint> {
        self.points.last()
    }

    /// Maximum drawdown over the whole series.
    pub fn max_drawdown(&self) -> Option<f64> {
        self.last().map(|p| p.max_drawdown)
    }

    /// Average drawdown over the whole series.
    pub fn avg_drawdown(&self) -> Option<f64> {
        self.last().map(|p| p.avg_drawdown)
    }
}

/// Summary of one window of a windowed drawdown run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawdownSummary {
    /// First date in the window
    pub start: NaiveDate,
    /// Last date in the window
    pub end: NaiveDate,
    /// Number of observations in the window
    pub observations: usize,
    /// Max drawdown within the window (peak resets at the window start)
    pub max_drawdown: f64,
    /// Average drawdown over the window's own observations
    pub avg_drawdown: f64,
}

/// Sharpe ratio computation mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SharpeMode {
    /// One ratio over the entire input range
    FullPeriod,
    /// One ratio per calendar month
    Monthly,
    /// One ratio per calendar year
    Yearly,
}

impl SharpeMode {
    /// The calendar bucket for periodic modes.
    pub fn period(self) -> Option<Period> {
        match self {
            SharpeMode::FullPeriod => None,
            SharpeMode::Monthly => Some(Period::Month),
            SharpeMode::Yearly => Some(Period::Year),
        }
    }
}

impl FromStr for SharpeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full_period" | "full-period" => Ok(SharpeMode::FullPeriod),
            "monthly" | "me" => Ok(SharpeMode::Monthly),
            "yearly" | "ye" => Ok(SharpeMode::Yearly),
            other => Err(Error::InvalidArgument(format!(
                "unsupported Sharpe mode '{}', expected full, monthly (ME) or yearly (YE)",
                other
            ))),
        }
    }
}

impl fmt::Display for SharpeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SharpeMode::FullPeriod => "full",
            SharpeMode::Monthly => "monthly",
            SharpeMode::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Sharpe ratio for one calendar bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodSharpe {
    /// Last calendar day of the bucket (month end or year end)
    pub period_end: NaiveDate,
    /// Number of returns in the bucket
    pub observations: usize,
    /// Ratio, or `None` when the bucket has too little data
    pub sharpe: Option<f64>,
}

/// Output of a Sharpe computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum SharpeResult {
    /// Single ratio; `None` when undefined
    FullPeriod(Option<f64>),
    /// One entry per calendar bucket, in date order
    Periodic(Vec<PeriodSharpe>),
}

impl SharpeResult {
    /// The full-period ratio, if this is a full-period result.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SharpeResult::FullPeriod(value) => *value,
            SharpeResult::Periodic(_) => None,
        }
    }

    /// The per-bucket ratios, if this is a periodic result.
    pub fn as_periodic(&self) -> Option<&[PeriodSharpe]> {
        match self {
            SharpeResult::FullPeriod(_) => None,
            SharpeResult::Periodic(periods) => Some(periods),
        }
    }
}

/// Summary statistics for one named series over one evaluation window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    /// Column / series name
    pub name: String,
    /// Last observed value
    pub raw_value: f64,
    /// `raw_value / base - 1`
    pub return_since_base: f64,
    /// Full-period annualized Sharpe ratio
    pub sharpe: Option<f64>,
    /// Full-period maximum drawdown
    pub max_drawdown: f64,
}

impl PerformanceRecord {
    /// Flatten into `{name, name_returns, name_sharpe, name_mdd}`.
    pub fn to_keyed_map(&self) -> BTreeMap<String, Option<f64>> {
        let mut map = BTreeMap::new();
        map.insert(self.name.clone(), Some(self.raw_value));
        map.insert(format!("{}_returns", self.name), Some(self.return_since_base));
        map.insert(format!("{}_sharpe", self.name), self.sharpe);
        map.insert(format!("{}_mdd", self.name), Some(self.max_drawdown));
        map
    }
}

/// API response wrapper used by the CLI's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
