//! Time-series performance analytics.
//!
//! Provides drawdown profiles, annualized Sharpe ratios and the summary
//! performance record built from them.

mod drawdown;
mod performance;
mod sharpe;

pub use drawdown::{compute_drawdown, compute_windowed_drawdown, DEFAULT_DRAWDOWN_WINDOW};
pub use performance::{compute_stats, compute_stats_with, DEFAULT_BASE_VALUE};
pub use sharpe::{compute_sharpe, compute_sharpe_between, DAYS_PER_YEAR};
