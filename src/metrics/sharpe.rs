//! Sharpe ratio of a security against a benchmark
//!
//! Daily close-to-close returns of both series are aligned by calendar date.
//! The ratio is the mean of the excess returns over their sample standard
//! deviation, annualized by `sqrt(252)`.

use super::round_to;
use crate::error::{MetricsError, Result};
use crate::types::{BenchmarkPoint, PricePoint, Series};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Trading days used to annualize daily figures
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpeRatio {
    pub symbol: String,
    pub benchmark: String,
    /// Number of aligned excess returns
    pub observations: usize,
    pub daily: f64,
    /// Three decimals
    pub annualized: f64,
}

/// Close-to-close returns keyed by the date of the later bar
///
/// Bars must be daily: a second bar on the same calendar date is `InvalidArgument`.
pub fn daily_returns(series: &Series<PricePoint>) -> Result<BTreeMap<NaiveDate, f64>> {
    let mut returns = BTreeMap::new();
    for window in series.points().windows(2) {
        let prev = &window[0];
        let curr = &window[1];
        let date = curr.timestamp.date_naive();
        if prev.timestamp.date_naive() == date {
            return Err(MetricsError::InvalidArgument(format!(
                "{} has more than one bar on {}",
                series.key(),
                date
            )));
        }
        if prev.close == 0.0 {
            return Err(MetricsError::DivisionByZero(format!(
                "{} closes at zero on {}",
                series.key(),
                prev.timestamp
            )));
        }
        returns.insert(date, (curr.close - prev.close) / prev.close);
    }
    Ok(returns)
}

/// `stock - benchmark` for every date both sides have a defined return
pub fn excess_returns(
    stock: &BTreeMap<NaiveDate, f64>,
    benchmark: &BTreeMap<NaiveDate, f64>,
) -> Vec<f64> {
    stock
        .iter()
        .filter_map(|(date, r)| benchmark.get(date).map(|b| r - b))
        .filter(|e| e.is_finite())
        .collect()
}

/// Annualized Sharpe ratio of `series` against `benchmark`
pub fn compute(
    series: &Series<PricePoint>,
    benchmark: &Series<BenchmarkPoint>,
) -> Result<SharpeRatio> {
    for s in [series, benchmark] {
        if s.len() < 2 {
            return Err(MetricsError::InsufficientData(format!(
                "{} has {} point(s), at least 2 are needed for a return",
                s.key(),
                s.len()
            )));
        }
    }

    let excess = excess_returns(&daily_returns(series)?, &daily_returns(benchmark)?);
    if excess.len() < 2 {
        return Err(MetricsError::InsufficientData(format!(
            "{} shares {} return date(s) with {}",
            series.key(),
            excess.len(),
            benchmark.key()
        )));
    }

    let mean = (&excess[..]).mean();
    let std = (&excess[..]).std_dev();
    if std == 0.0 {
        return Err(MetricsError::DivisionByZero(format!(
            "excess returns of {} over {} have zero deviation",
            series.key(),
            benchmark.key()
        )));
    }

    let daily = mean / std;
    Ok(SharpeRatio {
        symbol: series.key().to_string(),
        benchmark: benchmark.key().to_string(),
        observations: excess.len(),
        daily,
        annualized: round_to(daily * TRADING_DAYS_PER_YEAR.sqrt(), 3),
    })
}
