//! Historical tail-risk estimation.
//!
//! Provides alpha normalization, historical VaR and historical CVaR.

mod alpha;
mod historical;

pub use alpha::{normalize_alpha, Alpha, DEFAULT_ALPHA};
pub use historical::{historical_cvar, historical_var, percentile, series_cvar, series_var};
