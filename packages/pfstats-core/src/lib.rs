//! pfstats Core - Portfolio performance analytics library.
//!
//! This crate computes standardized risk/return statistics from date-indexed
//! price and value series:
//!
//! - **Drawdown**: per-date drawdown, running max and running average drawdown,
//!   over the full period or in fixed-size windows
//! - **Sharpe ratio**: annualized, over the full period or per month / year
//! - **Portfolio volatility**: standard deviation from weights, per-asset
//!   volatilities and a correlation matrix
//! - **Performance records**: the summary row (last value, return, Sharpe, max
//!   drawdown) for one named series
//!
//! Price and risk-free data come from callers through the
//! [`providers::PriceSeriesProvider`] and [`providers::RiskFreeRateProvider`]
//! traits; nothing in this crate performs network I/O.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pfstats_core::analytics::compute_drawdown;
//! use pfstats_core::series::TimeSeries;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = TimeSeries::from_business_days(start, &[100.0, 90.0, 95.0, 80.0, 120.0]).unwrap();
//!
//! let drawdown = compute_drawdown(&series).unwrap();
//! assert_eq!(drawdown.max_drawdown(), Some(0.2));
//! ```

pub mod analytics;
pub mod config;
pub mod portfolio;
pub mod providers;
pub mod series;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, DrawdownPoint, DrawdownResult, DrawdownSummary, PerformanceRecord, PeriodSharpe,
    SharpeMode, SharpeResult,
};

// Re-export main functionality
pub use analytics::{
    compute_drawdown, compute_sharpe, compute_sharpe_between, compute_stats, compute_stats_with,
    compute_windowed_drawdown,
};
pub use config::AnalyticsConfig;
pub use portfolio::{
    build_portfolio_frame, compute_portfolio_std, CorrelationMatrix, PortfolioFrame,
    PortfolioSpec,
};
pub use providers::{PriceSeriesProvider, RiskFreeRateProvider, StaticPriceSource, StaticRateSource};
pub use series::{Observation, TimeSeries};

/// Error types for pfstats-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid correlation matrix: {0}")]
    InvalidCorrelationMatrix(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Data source error: {0}")]
    DataSource(String),
}

/// Result type for pfstats-core operations.
pub type Result<T> = std::result::Result<T, Error>;
