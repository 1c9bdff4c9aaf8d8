//! Summary statistics and portfolio aggregation over return tables.

use crate::types::{CovarianceMatrix, MeanReturns, ReturnsSeries, ReturnsTable};
use crate::{Error, Result};

/// Equal weights for `n` assets.
pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

impl ReturnsTable {
    /// Drop every row that has a missing entry in any column.
    pub fn dropna(&self) -> ReturnsTable {
        let rows = self.n_rows().unwrap_or(0);
        let keep: Vec<usize> = (0..rows)
            .filter(|&t| self.columns().all(|(_, s)| s.get(t).is_some()))
            .collect();

        ReturnsTable::from_columns(
            self.columns()
                .map(|(asset, series)| {
                    let values = keep.iter().map(|&t| series.get(t)).collect();
                    (asset.to_string(), ReturnsSeries::new(values))
                })
                .collect(),
        )
    }

    /// Row-wise weighted sum of the columns.
    ///
    /// A row with any missing entry gives a missing portfolio return.
    pub fn weighted_portfolio(&self, weights: &[f64]) -> Result<ReturnsSeries> {
        if weights.len() != self.n_columns() {
            return Err(Error::dimension(
                "portfolio weights",
                self.n_columns(),
                weights.len(),
            ));
        }

        let rows = self.n_rows().unwrap_or(0);
        let values = (0..rows)
            .map(|t| {
                self.columns()
                    .zip(weights)
                    .map(|((_, series), w)| series.get(t).map(|r| r * w))
                    .sum::<Option<f64>>()
            })
            .collect();

        Ok(ReturnsSeries::new(values))
    }

    /// Mean of the non-missing returns in each column.
    pub fn mean_returns(&self) -> Result<MeanReturns> {
        let values = self
            .columns()
            .map(|(asset, series)| {
                let clean = series.clean();
                if clean.is_empty() {
                    return Err(Error::UndefinedComputation(format!(
                        "mean of {} has no observations",
                        asset
                    )));
                }
                Ok(clean.iter().sum::<f64>() / clean.len() as f64)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MeanReturns::new(self.assets(), values))
    }

    /// Sample covariance matrix (n - 1 denominator).
    ///
    /// Each pair of columns uses the rows where both are present.
    pub fn covariance(&self) -> Result<CovarianceMatrix> {
        let columns: Vec<(&str, &ReturnsSeries)> = self.columns().collect();
        let n = columns.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i..n {
                let cov = pairwise_covariance(columns[i].1, columns[j].1).ok_or_else(|| {
                    Error::UndefinedComputation(format!(
                        "covariance of {} and {} needs at least 2 paired observations",
                        columns[i].0, columns[j].0
                    ))
                })?;
                values[i][j] = cov;
                values[j][i] = cov;
            }
        }

        Ok(CovarianceMatrix::new(self.assets(), values))
    }
}

fn pairwise_covariance(x: &ReturnsSeries, y: &ReturnsSeries) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = (0..x.len())
        .filter_map(|t| Some((x.get(t)?, y.get(t)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    Some(
        pairs
            .iter()
            .map(|(a, b)| (a - mean_x) * (b - mean_y))
            .sum::<f64>()
            / (n - 1.0),
    )
}
