//! Portfolio volatility from a covariance decomposition.
//!
//! σ_p² = Σᵢ Σⱼ wᵢ wⱼ σᵢ σⱼ ρᵢⱼ, i.e. wᵀ Σ w with Σ = outer(σ, σ) ⊙ ρ.

use super::spec::check_weight_sum;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Negative variance within this distance of zero is rounding noise and is
/// clamped to zero instead of rejected.
const VARIANCE_TOLERANCE: f64 = 1e-12;

/// Dense square correlation matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CorrelationMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl CorrelationMatrix {
    /// Create a matrix from rows. Every row must have as many entries as
    /// there are rows.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(Error::DimensionMismatch(format!(
                    "correlation matrix row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend(row);
        }
        Ok(Self { dim, data })
    }

    /// The n×n identity (uncorrelated assets).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { dim, data }
    }

    /// Number of assets.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Correlation between assets `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.dim || j >= self.dim {
            return None;
        }
        Some(self.data[i * self.dim + j])
    }

    /// Rows as nested vectors.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.dim == 0 {
            return Vec::new();
        }
        self.data.chunks(self.dim).map(<[f64]>::to_vec).collect()
    }

    /// Covariance matrix `outer(σ, σ) ⊙ ρ`, row-major.
    ///
    /// The diagonal is σᵢ² by definition of variance, whatever the stored
    /// self-correlation is.
    fn covariance(&self, std_devs: &[f64]) -> Vec<f64> {
        let n = self.dim;
        let mut cov = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let rho = if i == j { 1.0 } else { self.data[i * n + j] };
                cov[i * n + j] = std_devs[i] * std_devs[j] * rho;
            }
        }
        cov
    }
}

impl TryFrom<Vec<Vec<f64>>> for CorrelationMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        CorrelationMatrix::new(rows)
    }
}

impl From<CorrelationMatrix> for Vec<Vec<f64>> {
    fn from(matrix: CorrelationMatrix) -> Self {
        matrix.rows()
    }
}

/// Calculate portfolio standard deviation.
///
/// # Arguments
///
/// * `weights` - Asset weights; absolute values must sum to at most 1
/// * `std_devs` - Per-asset annualized standard deviations, same order
/// * `correlations` - n×n correlation matrix, same order
///
/// # Returns
///
/// `sqrt(wᵀ Σ w)`. Fails with `DimensionMismatch` when the inputs disagree on
/// n, and with `InvalidCorrelationMatrix` when the variance comes out
/// negative (the matrix is not positive semi-definite).
///
/// # Example
///
/// ```rust
/// use pfstats_core::portfolio::{compute_portfolio_std, CorrelationMatrix};
///
/// // Two uncorrelated assets, equal weight and volatility
/// let std = compute_portfolio_std(&[0.5, 0.5], &[0.2, 0.2], &CorrelationMatrix::identity(2)).unwrap();
/// assert!((std - 0.2 / 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn compute_portfolio_std(
    weights: &[f64],
    std_devs: &[f64],
    correlations: &CorrelationMatrix,
) -> Result<f64> {
    let n = weights.len();
    if n == 0 {
        return Err(Error::InvalidArgument(
            "weights cannot be empty".to_string(),
        ));
    }
    if std_devs.len() != n {
        return Err(Error::DimensionMismatch(format!(
            "{} weights but {} standard deviations",
            n,
            std_devs.len()
        )));
    }
    if correlations.dim() != n {
        return Err(Error::DimensionMismatch(format!(
            "{} weights but a {}x{} correlation matrix",
            n,
            correlations.dim(),
            correlations.dim()
        )));
    }
    if weights.iter().chain(std_devs).any(|v| !v.is_finite()) {
        return Err(Error::InvalidArgument(
            "weights and standard deviations must be finite".to_string(),
        ));
    }
    check_weight_sum(weights)?;

    let cov = correlations.covariance(std_devs);

    // wᵀ (Σ w)
    let variance: f64 = (0..n)
        .map(|i| {
            let row: f64 = (0..n).map(|j| cov[i * n + j] * weights[j]).sum();
            weights[i] * row
        })
        .sum();

    if variance.is_nan() || variance < -VARIANCE_TOLERANCE {
        tracing::warn!(variance, "portfolio variance is negative");
        return Err(Error::InvalidCorrelationMatrix(format!(
            "portfolio variance is {}, correlation matrix is not positive semi-definite",
            variance
        )));
    }

    Ok(variance.max(0.0).sqrt())
}
