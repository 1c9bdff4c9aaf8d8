//! Historical (empirical distribution) VaR and CVaR.
//!
//! Both estimators accept either a single return series or a table of series.
//! Table inputs are handled column by column with the same alpha and produce a
//! per-asset result in column order.

use super::alpha::normalize_alpha;
use crate::types::{AssetValue, Returns, ReturnsSeries, ReturnsTable, RiskResult};
use crate::{Error, Result};
use tracing::{debug, warn};

/// Percentile of `data` with linear interpolation between order statistics.
///
/// `percent` is in [0, 100]. The rank is `percent / 100 * (n - 1)` and the
/// result interpolates between the floor and ceiling ranks.
///
/// # Example
///
/// ```rust
/// use tailrisk_core::percentile;
///
/// let p = percentile(&[4.0, 1.0, 3.0, 2.0], 50.0).unwrap();
/// assert!((p - 2.5).abs() < 1e-12);
/// ```
pub fn percentile(data: &[f64], percent: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::UndefinedComputation(
            "percentile of an empty series".to_string(),
        ));
    }

    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::InvalidArgument(format!(
            "percentile must be in [0, 100], got {}",
            percent
        )));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = percent / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    if lower == upper || weight == 0.0 {
        return Ok(sorted[lower]);
    }

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Historical VaR of a single series.
///
/// Missing entries are dropped and the result is the alpha-th percentile of
/// what remains, so a small alpha usually gives a negative number (a loss).
pub fn series_var(series: &ReturnsSeries, alpha: f64) -> Result<f64> {
    let percent = normalize_alpha(alpha)?;
    let clean = series.clean();

    if clean.is_empty() {
        return Err(Error::UndefinedComputation(format!(
            "VaR needs at least one non-missing return ({} missing of {})",
            series.missing_count(),
            series.len()
        )));
    }

    let var = percentile(&clean, percent)?;
    debug!(observations = clean.len(), alpha = percent, var, "historical VaR");
    Ok(var)
}

/// Historical CVaR (expected shortfall) of a single series.
///
/// Averages the non-missing returns at or below the VaR at the same alpha.
/// Returns `Ok(None)` when no return reaches the threshold, which only happens
/// for degenerate inputs such as infinite returns.
pub fn series_cvar(series: &ReturnsSeries, alpha: f64) -> Result<Option<f64>> {
    let var = series_var(series, alpha)?;

    let tail: Vec<f64> = series.clean().into_iter().filter(|&r| r <= var).collect();

    if tail.is_empty() {
        warn!(var, "CVaR tail is empty, result is undefined");
        return Ok(None);
    }

    let cvar = tail.iter().sum::<f64>() / tail.len() as f64;
    debug!(tail = tail.len(), var, cvar, "historical CVaR");
    Ok(Some(cvar))
}

/// Historical VaR for a series or a table of series.
///
/// # Arguments
///
/// * `returns` - Single series or asset-keyed table of fractional returns
/// * `alpha` - Significance level as a proportion (0.05) or a percent (5)
///
/// # Returns
///
/// A scalar for a series, or one value per column for a table.
///
/// # Example
///
/// ```rust
/// use tailrisk_core::{historical_var, Returns, ReturnsSeries};
///
/// let returns = Returns::Series(ReturnsSeries::from_values(&[-0.02, 0.01, 0.03]));
/// let var = historical_var(&returns, 0.5).unwrap();
/// assert_eq!(var.single(), Some(&0.01));
/// ```
pub fn historical_var(returns: &Returns, alpha: f64) -> Result<RiskResult<f64>> {
    match returns {
        Returns::Series(series) => series_var(series, alpha).map(RiskResult::Single),
        Returns::Table(table) => {
            aggregate_columns(table, |series| series_var(series, alpha)).map(RiskResult::PerAsset)
        }
    }
}

/// Historical CVaR for a series or a table of series.
///
/// Same input and output shapes as [`historical_var`]. A `None` entry marks a
/// column whose tail was empty.
pub fn historical_cvar(returns: &Returns, alpha: f64) -> Result<RiskResult<Option<f64>>> {
    match returns {
        Returns::Series(series) => series_cvar(series, alpha).map(RiskResult::Single),
        Returns::Table(table) => {
            aggregate_columns(table, |series| series_cvar(series, alpha)).map(RiskResult::PerAsset)
        }
    }
}

/// Apply a per-series estimator to every column independently.
///
/// The first failing column aborts the aggregation.
fn aggregate_columns<T, F>(table: &ReturnsTable, estimator: F) -> Result<Vec<AssetValue<T>>>
where
    F: Fn(&ReturnsSeries) -> Result<T>,
{
    table
        .columns()
        .map(|(asset, series)| -> Result<AssetValue<T>> {
            Ok(AssetValue {
                asset: asset.to_string(),
                value: estimator(series)?,
            })
        })
        .collect()
}
