//! Tailrisk Core - Historical tail-risk estimation library.
//!
//! This crate provides:
//!
//! - **Alpha normalization**: significance levels given as a proportion or a percent
//! - **Historical VaR**: percentile-based loss thresholds for a series or a table of series
//! - **Historical CVaR**: expected shortfall at or below the VaR threshold
//! - **Portfolio performance**: mean/variance scaling of a weighted portfolio
//! - **Price pipeline**: prices to returns, mean returns and covariance
//!
//! # Example
//!
//! ```rust
//! use tailrisk_core::{historical_cvar, historical_var, Returns, ReturnsSeries, RiskResult};
//!
//! let series = ReturnsSeries::from_values(&[-0.05, -0.03, -0.01, 0.0, 0.02, 0.04, 0.06]);
//! let returns = Returns::Series(series);
//!
//! let var = historical_var(&returns, 5.0).unwrap();
//! let cvar = historical_cvar(&returns, 5.0).unwrap();
//!
//! assert!(matches!(var, RiskResult::Single(v) if (v + 0.044).abs() < 1e-12));
//! assert!(matches!(cvar, RiskResult::Single(Some(c)) if (c + 0.05).abs() < 1e-12));
//! ```

pub mod config;
pub mod data;
pub mod portfolio;
pub mod risk;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, AssetValue, CovarianceMatrix, MeanReturns, Returns, ReturnsSeries, ReturnsTable,
    RiskResult,
};

// Re-export main functionality
pub use config::RiskConfig;
pub use data::{equal_weights, PriceTable};
pub use portfolio::{portfolio_performance, PortfolioPerformance};
pub use risk::{
    historical_cvar, historical_var, normalize_alpha, percentile, series_cvar, series_var, Alpha,
    DEFAULT_ALPHA,
};

/// Error types for tailrisk-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Undefined computation: {0}")]
    UndefinedComputation(String),
}

impl Error {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

/// Result type for tailrisk-core operations.
pub type Result<T> = std::result::Result<T, Error>;
