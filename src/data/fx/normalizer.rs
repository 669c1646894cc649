//! Exchange-rate normalizer
//!
//! A left outer join of prices onto rates keyed by nearest timestamp: every
//! price bar resolves its own rate independently, so differing sampling
//! frequencies or gaps in the rate series never shift rows and no bar is
//! dropped.

use crate::currency::{Currency, CurrencyPair};
use crate::data::repository::PriceRepository;
use crate::error::{MetricsError, Result};
use crate::resolver;
use crate::types::{ExchangeRatePoint, PricePoint, Series};

/// Express `prices` in the currency of `rates` (price / rate, field by field)
pub fn normalize(
    prices: &Series<PricePoint>,
    rates: &Series<ExchangeRatePoint>,
) -> Result<Series<PricePoint>> {
    apply(prices, rates, |price, rate| price / rate)
}

/// Inverse of [`normalize`]: multiply back by the same resolved rates
pub fn denormalize(
    normalized: &Series<PricePoint>,
    rates: &Series<ExchangeRatePoint>,
) -> Result<Series<PricePoint>> {
    apply(normalized, rates, |price, rate| price * rate)
}

fn apply(
    prices: &Series<PricePoint>,
    rates: &Series<ExchangeRatePoint>,
    op: impl Fn(f64, f64) -> f64,
) -> Result<Series<PricePoint>> {
    let points = prices
        .iter()
        .map(|p| {
            let r = resolver::resolve(rates, p.timestamp)?;
            check_rate(r)?;
            Ok(PricePoint {
                symbol: p.symbol.clone(),
                timestamp: p.timestamp,
                open: op(p.open, r.open),
                high: op(p.high, r.high),
                low: op(p.low, r.low),
                close: op(p.close, r.close),
                volume: p.volume,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Same timestamps as the input, so the order still holds
    Series::new(prices.key(), points)
}

fn check_rate(rate: &ExchangeRatePoint) -> Result<()> {
    let fields = [
        ("open", rate.open),
        ("high", rate.high),
        ("low", rate.low),
        ("close", rate.close),
    ];
    match fields.iter().find(|(_, v)| *v == 0.0) {
        Some((name, _)) => Err(MetricsError::DivisionByZero(format!(
            "{} {} rate is zero at {}",
            rate.pair, name, rate.timestamp
        ))),
        None => Ok(()),
    }
}

/// Normalizer bound to a repository and the currency prices are stored in
pub struct ExchangeRateNormalizer<'a, R: ?Sized> {
    repository: &'a R,
    base: Currency,
}

impl<'a, R: PriceRepository + ?Sized> ExchangeRateNormalizer<'a, R> {
    pub fn new(repository: &'a R, base: Currency) -> Self {
        Self { repository, base }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// Rate series needed to reach `target`; `None` when `target` is the base currency
    pub fn rates_for(&self, target: Currency) -> Result<Option<Series<ExchangeRatePoint>>> {
        if target == self.base {
            return Ok(None);
        }
        let pair = CurrencyPair::for_target(target, self.base);
        let rates = self.repository.rates(&pair.symbol(), None)?;
        if rates.is_empty() {
            return Err(MetricsError::NotFound(format!(
                "No exchange rates stored for {}",
                pair
            )));
        }
        Ok(Some(rates))
    }

    /// Convert one series into `target`; the base currency returns the input untouched
    pub fn normalize(
        &self,
        prices: Series<PricePoint>,
        target: Currency,
    ) -> Result<Series<PricePoint>> {
        match self.rates_for(target)? {
            None => Ok(prices),
            Some(rates) => normalize(&prices, &rates),
        }
    }
}
