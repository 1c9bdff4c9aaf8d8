//! Default estimation settings.

use crate::risk::{normalize_alpha, DEFAULT_ALPHA};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trading days per year.
pub const DEFAULT_TIME_HORIZON: f64 = 252.0;

/// Defaults used when a caller does not pass alpha or a time horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Significance level, as a proportion or a percent
    pub alpha: f64,
    /// Periods per projection horizon
    pub time_horizon: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            time_horizon: DEFAULT_TIME_HORIZON,
        }
    }
}

impl RiskConfig {
    /// Load the config from the default path, then apply environment overrides.
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        let config = Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Self::default()
        });
        config.with_env_overrides()
    }

    /// Get the default config file path.
    ///
    /// Default path: `~/.tailrisk/config.json`
    /// Can be overridden with `TAILRISK_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TAILRISK_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".tailrisk/config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load config from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: RiskConfig = serde_json::from_str(&content)?;
        config.validate()?;

        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Apply `TAILRISK_ALPHA` and `TAILRISK_TIME_HORIZON` if set and valid.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            env::var("TAILRISK_ALPHA").ok().as_deref(),
            env::var("TAILRISK_TIME_HORIZON").ok().as_deref(),
        )
    }

    fn with_overrides(mut self, alpha: Option<&str>, time_horizon: Option<&str>) -> Self {
        if let Some(raw) = alpha {
            match raw.trim().parse::<f64>() {
                Ok(value) if normalize_alpha(value).is_ok() => self.alpha = value,
                _ => warn!(value = raw, "ignoring invalid TAILRISK_ALPHA"),
            }
        }

        if let Some(raw) = time_horizon {
            match raw.trim().parse::<f64>() {
                Ok(value) if value > 0.0 && value.is_finite() => self.time_horizon = value,
                _ => warn!(value = raw, "ignoring invalid TAILRISK_TIME_HORIZON"),
            }
        }

        self
    }

    /// Check that alpha normalizes and the horizon is positive.
    pub fn validate(&self) -> Result<()> {
        normalize_alpha(self.alpha)?;

        if !(self.time_horizon > 0.0 && self.time_horizon.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "time_horizon must be positive, got {}",
                self.time_horizon
            )));
        }

        Ok(())
    }
}
