//! Mean/variance portfolio performance.

use crate::types::{CovarianceMatrix, MeanReturns};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Expected return and volatility of a weighted portfolio over a horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Weighted mean return scaled by the horizon
    pub expected_return: f64,
    /// Portfolio standard deviation scaled by the square root of the horizon
    pub std_dev: f64,
}

impl PortfolioPerformance {
    /// `(expected_return, std_dev)`
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.expected_return, self.std_dev)
    }
}

/// Project single-period portfolio statistics onto a longer horizon.
///
/// # Arguments
///
/// * `weights` - One weight per asset, in the order of `mean_returns`
/// * `mean_returns` - Per-period mean return of each asset
/// * `cov_matrix` - Per-period covariance matrix of asset returns
/// * `time_horizon` - Number of periods to scale to (e.g., 252 trading days)
///
/// # Returns
///
/// `expected_return = (w · μ) * T` and `std_dev = sqrt(wᵀ Σ w) * sqrt(T)`,
/// or a dimension mismatch if the inputs disagree on the number of assets.
///
/// # Example
///
/// ```rust
/// use tailrisk_core::{portfolio_performance, CovarianceMatrix, MeanReturns};
///
/// let means = MeanReturns::from_values(vec![0.001, 0.002]);
/// let cov = CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0001], vec![0.0001, 0.0009]]);
///
/// let perf = portfolio_performance(&[0.5, 0.5], &means, &cov, 252.0).unwrap();
/// assert!((perf.expected_return - 0.378).abs() < 1e-12);
/// ```
pub fn portfolio_performance(
    weights: &[f64],
    mean_returns: &MeanReturns,
    cov_matrix: &CovarianceMatrix,
    time_horizon: f64,
) -> Result<PortfolioPerformance> {
    let n = weights.len();

    if mean_returns.len() != n {
        return Err(Error::dimension("mean returns", n, mean_returns.len()));
    }

    if cov_matrix.dim() != n {
        return Err(Error::dimension("covariance rows", n, cov_matrix.dim()));
    }

    if let Some(row) = cov_matrix.values.iter().find(|row| row.len() != n) {
        return Err(Error::dimension("covariance columns", n, row.len()));
    }

    if mean_returns.assets != cov_matrix.assets {
        return Err(Error::InvalidArgument(format!(
            "mean returns assets {:?} do not match covariance assets {:?}",
            mean_returns.assets, cov_matrix.assets
        )));
    }

    let mean: f64 = weights
        .iter()
        .zip(&mean_returns.values)
        .map(|(w, mu)| w * mu)
        .sum();

    // wᵀ (Σ w)
    let variance: f64 = cov_matrix
        .values
        .iter()
        .zip(weights)
        .map(|(row, w_i)| w_i * row.iter().zip(weights).map(|(c, w_j)| c * w_j).sum::<f64>())
        .sum();

    let expected_return = mean * time_horizon;
    let std_dev = variance.sqrt() * time_horizon.sqrt();

    debug!(
        assets = n,
        time_horizon,
        expected_return,
        std_dev,
        "portfolio performance"
    );

    Ok(PortfolioPerformance {
        expected_return,
        std_dev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_assets() -> (MeanReturns, CovarianceMatrix) {
        (
            MeanReturns::from_values(vec![0.001, 0.002]),
            CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0001], vec![0.0001, 0.0009]]),
        )
    }

    #[test]
    fn test_portfolio_performance() {
        let (means, cov) = two_assets();
        let perf = portfolio_performance(&[0.5, 0.5], &means, &cov, 252.0).unwrap();

        // 0.0015 * 252
        assert_relative_eq!(perf.expected_return, 0.378, epsilon = 1e-12);

        let variance: f64 = 0.25 * 0.0004 + 0.25 * 0.0009 + 2.0 * 0.25 * 0.0001;
        assert_relative_eq!(
            perf.std_dev,
            variance.sqrt() * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_single_period_horizon() {
        let (means, cov) = two_assets();
        let perf = portfolio_performance(&[1.0, 0.0], &means, &cov, 1.0).unwrap();

        assert_relative_eq!(perf.expected_return, 0.001, epsilon = 1e-15);
        assert_relative_eq!(perf.std_dev, 0.02, epsilon = 1e-15);
        assert_eq!(perf.as_tuple(), (perf.expected_return, perf.std_dev));
    }

    #[test]
    fn test_weights_length_mismatch() {
        let (means, cov) = two_assets();
        let result = portfolio_performance(&[0.3, 0.3, 0.4], &means, &cov, 252.0);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_covariance_shape_mismatch() {
        let means = MeanReturns::from_values(vec![0.001, 0.002]);

        let short_rows = CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0001]]);
        assert!(matches!(
            portfolio_performance(&[0.5, 0.5], &means, &short_rows, 252.0),
            Err(Error::DimensionMismatch { .. })
        ));

        let ragged = CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0001], vec![0.0001]]);
        assert!(matches!(
            portfolio_performance(&[0.5, 0.5], &means, &ragged, 252.0),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_asset_labels_must_agree() {
        let means = MeanReturns::new(
            vec!["CBA.AX".to_string(), "BHP.AX".to_string()],
            vec![0.001, 0.002],
        );
        let (_, cov) = two_assets();

        assert!(matches!(
            portfolio_performance(&[0.5, 0.5], &means, &cov, 252.0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
