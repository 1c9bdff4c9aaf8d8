//! Portfolio module.
//!
//! Provides mean/variance performance scaling for weighted portfolios.

mod performance;

pub use performance::{portfolio_performance, PortfolioPerformance};
