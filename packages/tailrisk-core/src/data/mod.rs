//! Price and return data preparation.
//!
//! Turns adjusted close prices into return tables and derives the summary
//! statistics consumed by the portfolio module.

mod prices;
mod returns;

pub use prices::PriceTable;
pub use returns::equal_weights;
