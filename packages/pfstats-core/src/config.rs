//! Analytics defaults loaded from a TOML file.

use crate::analytics::{DEFAULT_BASE_VALUE, DEFAULT_DRAWDOWN_WINDOW};
use crate::portfolio::DEFAULT_ASSET_PERIODS_PER_YEAR;
use crate::types::SharpeMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults applied when a caller does not specify them explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Starting value portfolio returns are measured against
    pub base_value: f64,
    /// Observations per window for windowed drawdown
    pub drawdown_window: usize,
    /// Sharpe mode used when none is given
    pub sharpe_mode: SharpeMode,
    /// Periods per year used to annualize asset volatility
    pub asset_periods_per_year: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_value: DEFAULT_BASE_VALUE,
            drawdown_window: DEFAULT_DRAWDOWN_WINDOW,
            sharpe_mode: SharpeMode::Yearly,
            asset_periods_per_year: DEFAULT_ASSET_PERIODS_PER_YEAR,
        }
    }
}

impl AnalyticsConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/pfstats/config.toml`
    /// Can be overridden with `PFSTATS_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PFSTATS_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("pfstats/config.toml"))
            .unwrap_or_else(|| PathBuf::from("pfstats.toml"))
    }

    /// Load config from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load config from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.base_value.is_nan() || self.base_value <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "base_value must be positive, got {}",
                self.base_value
            )));
        }
        if self.drawdown_window == 0 {
            return Err(Error::InvalidArgument(
                "drawdown_window must be at least 1".to_string(),
            ));
        }
        if self.asset_periods_per_year.is_nan() || self.asset_periods_per_year <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "asset_periods_per_year must be positive, got {}",
                self.asset_periods_per_year
            )));
        }
        Ok(())
    }
}
