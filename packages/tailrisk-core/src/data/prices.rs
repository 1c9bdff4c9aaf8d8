//! Adjusted close price tables.

use crate::types::{ReturnsSeries, ReturnsTable};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Adjusted close prices keyed by symbol, aligned on a shared date index.
///
/// JSON form:
///
/// ```json
/// { "dates": ["2024-01-02", "2024-01-03"], "prices": { "CBA.AX": [110.5, null] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceTable", into = "RawPriceTable")]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

#[derive(Serialize, Deserialize)]
struct RawPriceTable {
    dates: Vec<NaiveDate>,
    prices: Map<String, Value>,
}

impl PriceTable {
    /// Create an empty table over `dates`, which must be strictly increasing.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidArgument(format!(
                "dates must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            dates,
            columns: Vec::new(),
        })
    }

    /// Add a price column for `symbol`.
    pub fn insert(&mut self, symbol: &str, prices: Vec<Option<f64>>) -> Result<()> {
        if self.prices(symbol).is_some() {
            return Err(Error::InvalidArgument(format!(
                "Duplicate price column: {}",
                symbol
            )));
        }

        if prices.len() != self.dates.len() {
            return Err(Error::dimension(
                format!("prices for {}", symbol),
                self.dates.len(),
                prices.len(),
            ));
        }

        let prices = prices
            .into_iter()
            .map(|p| p.filter(|x| !x.is_nan()))
            .collect();
        self.columns.push((symbol.to_string(), prices));
        Ok(())
    }

    /// Load a price table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let table: PriceTable = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            symbols = table.columns.len(),
            rows = table.dates.len(),
            "loaded price table"
        );
        Ok(table)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Symbols in column order.
    pub fn symbols(&self) -> Vec<String> {
        self.columns.iter().map(|(s, _)| s.clone()).collect()
    }

    /// Prices for a symbol.
    pub fn prices(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, p)| p.as_slice())
    }

    /// Period-over-period simple returns: `p[t] / p[t-1] - 1`.
    ///
    /// Gaps are forward-filled with the last known price first, so a missing
    /// price gives a zero return and the next price is measured against the
    /// last known one. The first period is always missing, as is any period
    /// before the first price or where the previous price is zero.
    pub fn pct_change(&self) -> Result<ReturnsTable> {
        let mut table = ReturnsTable::new();

        for (symbol, prices) in &self.columns {
            let filled = forward_fill(prices);
            let returns = std::iter::once(None)
                .chain(filled.windows(2).map(|pair| match (pair[0], pair[1]) {
                    (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                    _ => None,
                }))
                .take(filled.len())
                .collect();

            table.insert(symbol, ReturnsSeries::new(returns))?;
        }

        Ok(table)
    }
}

fn forward_fill(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    prices
        .iter()
        .map(|&p| {
            if p.is_some() {
                last = p;
            }
            last
        })
        .collect()
}

impl TryFrom<RawPriceTable> for PriceTable {
    type Error = Error;

    fn try_from(raw: RawPriceTable) -> Result<Self> {
        let mut table = PriceTable::new(raw.dates)?;
        for (symbol, column) in raw.prices {
            let prices: Vec<Option<f64>> = serde_json::from_value(column)?;
            table.insert(&symbol, prices)?;
        }
        Ok(table)
    }
}

impl From<PriceTable> for RawPriceTable {
    fn from(table: PriceTable) -> Self {
        let prices = table
            .columns
            .into_iter()
            .map(|(symbol, prices)| (symbol, Value::from(prices)))
            .collect();

        RawPriceTable {
            dates: table.dates,
            prices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_json() -> &'static str {
        r#"{
            "dates": ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"],
            "prices": {
                "CBA.AX": [100.0, 102.0, null, 99.0],
                "BHP.AX": [50.0, 49.0, 49.49, 0.0]
            }
        }"#
    }

    #[test]
    fn test_deserialize_price_table() {
        let table: PriceTable = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(table.symbols(), vec!["CBA.AX", "BHP.AX"]);
        assert_eq!(table.dates()[0], date("2024-01-02"));
        assert_eq!(table.prices("CBA.AX").unwrap()[2], None);
    }

    #[test]
    fn test_pct_change() {
        let table: PriceTable = serde_json::from_str(sample_json()).unwrap();
        let returns = table.pct_change().unwrap();

        let cba = returns.column("CBA.AX").unwrap();
        assert_eq!(cba.len(), 4);
        assert_eq!(cba.get(0), None);
        assert_relative_eq!(cba.get(1).unwrap(), 0.02, epsilon = 1e-12);
        // the gap carries 102 forward
        assert_eq!(cba.get(2), Some(0.0));
        assert_relative_eq!(cba.get(3).unwrap(), 99.0 / 102.0 - 1.0, epsilon = 1e-12);

        let bhp = returns.column("BHP.AX").unwrap();
        assert_relative_eq!(bhp.get(1).unwrap(), -0.02, epsilon = 1e-12);
        assert_relative_eq!(bhp.get(2).unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(bhp.get(3).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pct_change_zero_previous_price() {
        let mut table = PriceTable::new(vec![date("2024-01-02"), date("2024-01-03")]).unwrap();
        table.insert("X", vec![Some(0.0), Some(1.0)]).unwrap();

        let returns = table.pct_change().unwrap();
        assert_eq!(returns.column("X").unwrap().missing_count(), 2);
    }

    #[test]
    fn test_pct_change_leading_gap() {
        let dates = (2..6)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let mut table = PriceTable::new(dates).unwrap();
        table
            .insert("X", vec![None, Some(50.0), None, Some(55.0)])
            .unwrap();

        let x = table.pct_change().unwrap();
        let x = x.column("X").unwrap();
        assert_eq!(x.get(0), None);
        assert_eq!(x.get(1), None);
        assert_eq!(x.get(2), Some(0.0));
        assert_relative_eq!(x.get(3).unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let result = PriceTable::new(vec![date("2024-01-03"), date("2024-01-02")]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_misaligned_prices() {
        let json = r#"{ "dates": ["2024-01-02"], "prices": { "A": [1.0, 2.0] } }"#;
        assert!(serde_json::from_str::<PriceTable>(json).is_err());

        let mut table = PriceTable::new(vec![date("2024-01-02")]).unwrap();
        assert!(matches!(
            table.insert("A", vec![Some(1.0), Some(2.0)]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();

        let table = PriceTable::load(file.path()).unwrap();
        assert_eq!(table.dates().len(), 4);

        let round_trip: PriceTable =
            serde_json::from_str(&serde_json::to_string(&table).unwrap()).unwrap();
        assert_eq!(round_trip, table);
    }
}
