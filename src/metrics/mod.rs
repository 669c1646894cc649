//! Financial metrics over price series

pub mod cagr;
pub mod sharpe;

pub use cagr::{CagrResult, Period};
pub use sharpe::{SharpeRatio, TRADING_DAYS_PER_YEAR};

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
