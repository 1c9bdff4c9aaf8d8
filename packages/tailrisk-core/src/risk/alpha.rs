//! Significance level normalization.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default significance level, in percent.
pub const DEFAULT_ALPHA: f64 = 5.0;

/// Convert a significance level to a percent in (0, 100).
///
/// Values in (0, 1] are read as proportions and scaled by 100; values in
/// (1, 100) are already percents and pass through unchanged.
///
/// # Example
///
/// ```rust
/// use tailrisk_core::normalize_alpha;
///
/// assert_eq!(normalize_alpha(0.05).unwrap(), 5.0);
/// assert_eq!(normalize_alpha(5.0).unwrap(), 5.0);
/// assert!(normalize_alpha(100.0).is_err());
/// ```
pub fn normalize_alpha(alpha: f64) -> Result<f64> {
    if alpha.is_nan() || alpha <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "alpha must be > 0, got {}",
            alpha
        )));
    }

    if alpha <= 1.0 {
        return Ok(alpha * 100.0);
    }

    if alpha < 100.0 {
        return Ok(alpha);
    }

    // 100 would select the whole distribution
    Err(Error::InvalidArgument(format!(
        "alpha must be in (0,1] or (1,100), got {}",
        alpha
    )))
}

/// A validated significance level.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Alpha(f64);

impl Alpha {
    /// Validate and normalize a raw alpha (proportion or percent).
    pub fn new(raw: f64) -> Result<Self> {
        normalize_alpha(raw).map(Alpha)
    }

    /// Alpha as a percent in (0, 100).
    pub fn percent(self) -> f64 {
        self.0
    }

    /// Alpha as a proportion in (0, 1).
    pub fn proportion(self) -> f64 {
        self.0 / 100.0
    }
}

impl Default for Alpha {
    fn default() -> Self {
        Alpha(DEFAULT_ALPHA)
    }
}

impl TryFrom<f64> for Alpha {
    type Error = Error;

    fn try_from(raw: f64) -> Result<Self> {
        Alpha::new(raw)
    }
}

impl From<Alpha> for f64 {
    fn from(alpha: Alpha) -> Self {
        alpha.0
    }
}

impl std::fmt::Display for Alpha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
