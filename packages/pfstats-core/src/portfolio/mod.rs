//! Portfolio construction and risk.
//!
//! Provides target weights, the aligned portfolio value series, and portfolio
//! volatility from weights, per-asset volatilities and correlations.

mod frame;
mod spec;
mod variance;

pub use frame::{build_portfolio_frame, AssetRisk, PortfolioFrame, DEFAULT_ASSET_PERIODS_PER_YEAR};
pub use spec::{Holding, PortfolioSpec};
pub use variance::{compute_portfolio_std, CorrelationMatrix};
