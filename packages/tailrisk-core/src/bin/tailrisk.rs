//! Tailrisk CLI - Command line interface for historical VaR/CVaR.
//!
//! Reads return or price tables from JSON files and prints JSON results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tailrisk_core::{
    equal_weights, historical_cvar, historical_var, normalize_alpha, portfolio_performance,
    ApiResponse, PriceTable, Returns, RiskConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tailrisk")]
#[command(about = "Historical VaR and CVaR for asset and portfolio returns")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Historical VaR of a returns series or table
    Var {
        /// JSON file: an array of returns or an object of asset -> returns
        #[arg(short, long)]
        returns: PathBuf,
        /// Significance level (0.05 or 5 = 5%)
        #[arg(short, long)]
        alpha: Option<f64>,
    },
    /// Historical CVaR (expected shortfall) of a returns series or table
    Cvar {
        /// JSON file: an array of returns or an object of asset -> returns
        #[arg(short, long)]
        returns: PathBuf,
        /// Significance level (0.05 or 5 = 5%)
        #[arg(short, long)]
        alpha: Option<f64>,
    },
    /// Portfolio VaR, CVaR and performance from adjusted close prices
    Report {
        /// JSON price table file
        #[arg(short, long)]
        prices: PathBuf,
        /// Portfolio weights (comma-separated, column order); equal if omitted
        #[arg(short, long)]
        weights: Option<String>,
        /// Significance level (0.05 or 5 = 5%)
        #[arg(short, long)]
        alpha: Option<f64>,
        /// Periods to scale performance to
        #[arg(long)]
        horizon: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RiskConfig::load();

    let result = match cli.command {
        Commands::Var { returns, alpha } => handle_var(&returns, alpha.unwrap_or(config.alpha)),
        Commands::Cvar { returns, alpha } => {
            handle_cvar(&returns, alpha.unwrap_or(config.alpha))
        }
        Commands::Report {
            prices,
            weights,
            alpha,
            horizon,
        } => handle_report(
            &prices,
            weights.as_deref(),
            alpha.unwrap_or(config.alpha),
            horizon.unwrap_or(config.time_horizon),
        ),
    };

    let output = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data))?,
        Err(e) => {
            tracing::debug!("command failed: {:#}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e)))?
        }
    };

    println!("{}", output);
    Ok(())
}

fn load_returns(path: &Path) -> Result<Returns> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(Returns::from_json(value)?)
}

fn handle_var(path: &Path, alpha: f64) -> Result<Value> {
    let returns = load_returns(path)?;
    let var = historical_var(&returns, alpha)?;
    Ok(json!({
        "alpha_percent": normalize_alpha(alpha)?,
        "var": var,
    }))
}

fn handle_cvar(path: &Path, alpha: f64) -> Result<Value> {
    let returns = load_returns(path)?;
    let cvar = historical_cvar(&returns, alpha)?;
    Ok(json!({
        "alpha_percent": normalize_alpha(alpha)?,
        "cvar": cvar,
    }))
}

fn parse_weights(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(|w| {
            w.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid weight: {:?}", w))
        })
        .collect()
}

fn handle_report(path: &Path, weights: Option<&str>, alpha: f64, horizon: f64) -> Result<Value> {
    let prices = PriceTable::load(path).with_context(|| format!("loading {}", path.display()))?;
    let raw = prices.pct_change()?;
    let returns = raw.dropna();

    let weights = match weights {
        Some(raw) => parse_weights(raw)?,
        None => equal_weights(returns.n_columns()),
    };

    let portfolio = Returns::Series(returns.weighted_portfolio(&weights)?);
    let var = historical_var(&portfolio, alpha)?;
    let cvar = historical_cvar(&portfolio, alpha)?;

    // moments use every available return per asset, not just the complete rows
    let mean_returns = raw.mean_returns()?;
    let cov_matrix = raw.covariance()?;
    let performance = portfolio_performance(&weights, &mean_returns, &cov_matrix, horizon)?;

    let weights_by_asset: serde_json::Map<String, Value> = returns
        .assets()
        .into_iter()
        .zip(weights.iter().map(|&w| json!(w)))
        .collect();

    Ok(json!({
        "weights": weights_by_asset,
        "observations": returns.n_rows().unwrap_or(0),
        "alpha_percent": normalize_alpha(alpha)?,
        "var": var,
        "cvar": cvar,
        "time_horizon": horizon,
        "expected_return": performance.expected_return,
        "std_dev": performance.std_dev,
    }))
}
