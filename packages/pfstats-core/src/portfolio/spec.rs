//! Target portfolio weights.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Slack allowed when checking that weights sum to at most 1, so that weights
/// such as `0.25 + 0.05 + 0.2 + 0.25 + 0.25` are not rejected for rounding.
pub(crate) const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// One ticker and its target weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol (uppercase)
    pub ticker: String,
    /// Fraction of portfolio value, in [0, 1]
    pub weight: f64,
}

/// Ordered ticker -> weight mapping.
///
/// Order matters: per-asset vectors and the correlation matrix derived from a
/// spec follow the order holdings were given in. Whatever the weights leave
/// unallocated (`1 - Σw`) is held as cash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Holding>", into = "Vec<Holding>")]
pub struct PortfolioSpec {
    holdings: Vec<Holding>,
}

impl PortfolioSpec {
    /// Create a spec from `(ticker, weight)` pairs.
    ///
    /// Rejects an empty mapping, blank or duplicate tickers, negative or
    /// non-finite weights, and weights summing above 1.
    pub fn new<I, S>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let holdings: Vec<Holding> = weights
            .into_iter()
            .map(|(ticker, weight)| Holding {
                ticker: ticker.as_ref().trim().to_uppercase(),
                weight,
            })
            .collect();
        Self::from_holdings(holdings)
    }

    fn from_holdings(holdings: Vec<Holding>) -> Result<Self> {
        if holdings.is_empty() {
            return Err(Error::InvalidArgument(
                "portfolio must contain at least one ticker".to_string(),
            ));
        }

        for (i, holding) in holdings.iter().enumerate() {
            if holding.ticker.is_empty() {
                return Err(Error::InvalidArgument("ticker cannot be empty".to_string()));
            }
            if !holding.weight.is_finite() || holding.weight < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "weight for {} must be a non-negative number, got {}",
                    holding.ticker, holding.weight
                )));
            }
            if holdings[..i].iter().any(|h| h.ticker == holding.ticker) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate ticker {}",
                    holding.ticker
                )));
            }
        }

        let weights: Vec<f64> = holdings.iter().map(|h| h.weight).collect();
        check_weight_sum(&weights)?;

        Ok(Self { holdings })
    }

    /// Holdings in spec order.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Tickers in spec order.
    pub fn tickers(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.ticker.as_str()).collect()
    }

    /// Weights in spec order.
    pub fn weights(&self) -> Vec<f64> {
        self.holdings.iter().map(|h| h.weight).collect()
    }

    /// Weight of `ticker` (case-insensitive).
    pub fn weight(&self, ticker: &str) -> Option<f64> {
        let ticker = ticker.to_uppercase();
        self.holdings
            .iter()
            .find(|h| h.ticker == ticker)
            .map(|h| h.weight)
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Always false for a validated spec; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }

    /// Unallocated fraction held as cash.
    pub fn cash_weight(&self) -> f64 {
        (1.0 - self.total_weight()).max(0.0)
    }

    /// The spec restricted to tickers with a positive weight.
    pub fn active(&self) -> Result<PortfolioSpec> {
        let holdings: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|h| h.weight > 0.0)
            .cloned()
            .collect();
        Self::from_holdings(holdings)
    }
}

impl TryFrom<Vec<Holding>> for PortfolioSpec {
    type Error = Error;

    fn try_from(holdings: Vec<Holding>) -> Result<Self> {
        PortfolioSpec::new(holdings.into_iter().map(|h| (h.ticker, h.weight)))
    }
}

impl From<PortfolioSpec> for Vec<Holding> {
    fn from(spec: PortfolioSpec) -> Self {
        spec.holdings
    }
}

/// Parses `"SPY=0.25,GLD=0.2,SHY=0.25"`.
impl FromStr for PortfolioSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (ticker, weight) = part.rsplit_once('=').ok_or_else(|| {
                Error::InvalidArgument(format!("expected TICKER=WEIGHT, got '{}'", part))
            })?;
            let weight: f64 = weight.trim().parse().map_err(|_| {
                Error::InvalidArgument(format!("invalid weight '{}' for {}", weight, ticker))
            })?;
            pairs.push((ticker.to_string(), weight));
        }
        PortfolioSpec::new(pairs)
    }
}

/// Reject weight vectors whose absolute sum exceeds 1.
pub(crate) fn check_weight_sum(weights: &[f64]) -> Result<()> {
    let total: f64 = weights.iter().map(|w| w.abs()).sum();
    if total > 1.0 + WEIGHT_SUM_TOLERANCE {
        return Err(Error::InvalidArgument(format!(
            "total of absolute weights is {}, must not exceed 1",
            total
        )));
    }
    Ok(())
}
