//! Core data types for the tailrisk system.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chronologically ordered series of per-period fractional returns.
///
/// Missing entries (`None`, or NaN at construction) are kept in place so the
/// series stays aligned with its time index, but they never take part in any
/// statistic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnsSeries {
    values: Vec<Option<f64>>,
}

impl ReturnsSeries {
    /// Create a series from possibly-missing values. NaN is treated as missing.
    pub fn new(values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self { values }
    }

    /// Create a series from plain floats, mapping NaN to a missing entry.
    pub fn from_values(values: &[f64]) -> Self {
        Self::new(values.iter().map(|&v| Some(v)).collect())
    }

    /// Number of periods, including missing ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw entries in time order.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Entry at period `index`, `None` when missing or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Non-missing values in time order.
    pub fn clean(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    /// Number of missing entries.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

impl From<Vec<f64>> for ReturnsSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::from_values(&values)
    }
}

/// Asset-keyed return series aligned on a common time index.
///
/// Columns keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnsTable {
    columns: Vec<(String, ReturnsSeries)>,
}

impl ReturnsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from columns already known to share a length and have
    /// unique names.
    pub(crate) fn from_columns(columns: Vec<(String, ReturnsSeries)>) -> Self {
        Self { columns }
    }

    /// Append a column.
    ///
    /// Fails if the asset is already present or the series length differs
    /// from the existing columns.
    pub fn insert(&mut self, asset: &str, series: ReturnsSeries) -> Result<()> {
        if self.column(asset).is_some() {
            return Err(Error::InvalidArgument(format!(
                "Duplicate asset column: {}",
                asset
            )));
        }

        if let Some(rows) = self.n_rows() {
            if series.len() != rows {
                return Err(Error::dimension(
                    format!("column {}", asset),
                    rows,
                    series.len(),
                ));
            }
        }

        self.columns.push((asset.to_string(), series));
        Ok(())
    }

    /// Builder-style `insert`.
    pub fn with_column(mut self, asset: &str, series: ReturnsSeries) -> Result<Self> {
        self.insert(asset, series)?;
        Ok(self)
    }

    /// Find a column by asset identifier.
    pub fn column(&self, asset: &str) -> Option<&ReturnsSeries> {
        self.columns
            .iter()
            .find(|(name, _)| name == asset)
            .map(|(_, series)| series)
    }

    /// Iterate over `(asset, series)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ReturnsSeries)> {
        self.columns.iter().map(|(name, s)| (name.as_str(), s))
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Common number of rows, or `None` for a table with no columns.
    pub fn n_rows(&self) -> Option<usize> {
        self.columns.first().map(|(_, s)| s.len())
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Input to the VaR/CVaR estimators: a single series or a table of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Returns {
    Series(ReturnsSeries),
    Table(ReturnsTable),
}

impl Returns {
    /// Build returns from untyped JSON.
    ///
    /// An array of numbers (or nulls) is a series; an object whose values are
    /// such arrays is a table. Anything else is a type mismatch.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Returns::Series(series_from_json(items, "series")?)),
            Value::Object(map) => {
                let mut table = ReturnsTable::new();
                for (asset, column) in map {
                    match column {
                        Value::Array(items) => {
                            table.insert(&asset, series_from_json(items, &asset)?)?
                        }
                        other => {
                            return Err(Error::TypeMismatch(format!(
                                "Expected column {} to be an array of returns, got {}",
                                asset,
                                json_kind(&other)
                            )))
                        }
                    }
                }
                Ok(Returns::Table(table))
            }
            other => Err(Error::TypeMismatch(format!(
                "Expected returns to be a series or a table, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<ReturnsSeries> for Returns {
    fn from(series: ReturnsSeries) -> Self {
        Returns::Series(series)
    }
}

impl From<ReturnsTable> for Returns {
    fn from(table: ReturnsTable) -> Self {
        Returns::Table(table)
    }
}

fn series_from_json(items: Vec<Value>, context: &str) -> Result<ReturnsSeries> {
    let values = items
        .into_iter()
        .map(|item| match item {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(Error::TypeMismatch(format!(
                "Expected numeric return in {}, got {}",
                context,
                json_kind(&other)
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReturnsSeries::new(values))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A value attached to an asset identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValue<T> {
    pub asset: String,
    pub value: T,
}

/// Estimator output with the same shape as the input returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RiskResult<T> {
    /// Result for a single series
    Single(T),
    /// One result per table column, in column order
    PerAsset(Vec<AssetValue<T>>),
}

impl<T> RiskResult<T> {
    /// The scalar result, if the input was a single series.
    pub fn single(&self) -> Option<&T> {
        match self {
            RiskResult::Single(v) => Some(v),
            RiskResult::PerAsset(_) => None,
        }
    }

    /// The result for `asset`, if the input was a table containing it.
    pub fn get(&self, asset: &str) -> Option<&T> {
        match self {
            RiskResult::Single(_) => None,
            RiskResult::PerAsset(values) => values
                .iter()
                .find(|v| v.asset == asset)
                .map(|v| &v.value),
        }
    }
}

/// Mean return per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanReturns {
    /// Asset identifiers
    pub assets: Vec<String>,
    /// Mean return for each asset, same order as `assets`
    pub values: Vec<f64>,
}

impl MeanReturns {
    pub fn new(assets: Vec<String>, values: Vec<f64>) -> Self {
        Self { assets, values }
    }

    /// Mean returns labelled by position ("0", "1", ...).
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            assets: index_labels(values.len()),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, asset: &str) -> Option<f64> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .and_then(|i| self.values.get(i).copied())
    }
}

/// Covariance matrix of asset returns, rows and columns in `assets` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    /// Asset identifiers labelling both axes
    pub assets: Vec<String>,
    /// Row-major matrix entries
    pub values: Vec<Vec<f64>>,
}

impl CovarianceMatrix {
    pub fn new(assets: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self { assets, values }
    }

    /// Matrix labelled by position ("0", "1", ...).
    pub fn from_rows(values: Vec<Vec<f64>>) -> Self {
        Self {
            assets: index_labels(values.len()),
            values,
        }
    }

    /// Number of rows.
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Covariance between two assets.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.assets.iter().position(|a| a == row)?;
        let j = self.assets.iter().position(|a| a == col)?;
        self.values.get(i).and_then(|r| r.get(j)).copied()
    }

    /// Check symmetry within an absolute tolerance.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.dim();
        self.values.iter().all(|row| row.len() == n)
            && (0..n).all(|i| {
                (i + 1..n).all(|j| (self.values[i][j] - self.values[j][i]).abs() <= tolerance)
            })
    }
}

fn index_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_series_nan_is_missing() {
        let series = ReturnsSeries::from_values(&[0.01, f64::NAN, -0.02]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.missing_count(), 1);
        assert_eq!(series.clean(), vec![0.01, -0.02]);
        assert_eq!(series.get(1), None);
    }

    #[test]
    fn test_table_preserves_insertion_order() {
        let table = ReturnsTable::new()
            .with_column("WBC", ReturnsSeries::from_values(&[0.01, 0.02]))
            .unwrap()
            .with_column("BHP", ReturnsSeries::from_values(&[0.03, 0.04]))
            .unwrap();

        assert_eq!(table.assets(), vec!["WBC", "BHP"]);
        assert_eq!(table.n_rows(), Some(2));
        assert_eq!(table.n_columns(), 2);
    }

    #[test]
    fn test_table_rejects_misaligned_column() {
        let mut table = ReturnsTable::new();
        table
            .insert("A", ReturnsSeries::from_values(&[0.01, 0.02]))
            .unwrap();
        let result = table.insert("B", ReturnsSeries::from_values(&[0.01]));
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_table_rejects_duplicate_column() {
        let mut table = ReturnsTable::new();
        table.insert("A", ReturnsSeries::from_values(&[0.01])).unwrap();
        let result = table.insert("A", ReturnsSeries::from_values(&[0.02]));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_returns_from_json_series() {
        let returns = Returns::from_json(json!([0.01, null, -0.02])).unwrap();
        match returns {
            Returns::Series(s) => {
                assert_eq!(s.len(), 3);
                assert_eq!(s.missing_count(), 1);
            }
            Returns::Table(_) => panic!("expected a series"),
        }
    }

    #[test]
    fn test_returns_from_json_table_keeps_order() {
        let returns = Returns::from_json(json!({
            "TLS": [0.01, 0.02],
            "CBA": [null, -0.01],
        }))
        .unwrap();

        match returns {
            Returns::Table(t) => assert_eq!(t.assets(), vec!["TLS", "CBA"]),
            Returns::Series(_) => panic!("expected a table"),
        }
    }

    #[test]
    fn test_returns_from_json_type_mismatch() {
        assert!(matches!(
            Returns::from_json(json!("returns")),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Returns::from_json(json!(0.5)),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Returns::from_json(json!({"A": 0.1})),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Returns::from_json(json!([0.1, "x"])),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_risk_result_accessors() {
        let single: RiskResult<f64> = RiskResult::Single(-0.02);
        assert_eq!(single.single(), Some(&-0.02));
        assert_eq!(single.get("A"), None);

        let per_asset = RiskResult::PerAsset(vec![AssetValue {
            asset: "A".to_string(),
            value: -0.03,
        }]);
        assert_eq!(per_asset.get("A"), Some(&-0.03));
        assert_eq!(per_asset.single(), None);
    }

    #[test]
    fn test_covariance_symmetry() {
        let cov = CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0001], vec![0.0001, 0.0009]]);
        assert!(cov.is_symmetric(1e-12));
        assert_eq!(cov.get("0", "1"), Some(0.0001));

        let skewed = CovarianceMatrix::from_rows(vec![vec![0.0004, 0.0002], vec![0.0001, 0.0009]]);
        assert!(!skewed.is_symmetric(1e-12));
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
