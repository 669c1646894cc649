//! Ordered repository contract
//!
//! The metrics engine never talks to storage directly. It asks an
//! `OrderedRepository` for a series (ascending by timestamp) or for a single
//! neighbour of a timestamp, and works on the returned snapshot.

use crate::error::Result;
use crate::types::{ExchangeRatePoint, PricePoint, Series, TimePoint, TimeRange, Timestamp};

/// Ordered reads over points of type `P`, keyed by symbol or currency pair
pub trait OrderedRepository<P: TimePoint> {
    /// All points for `key` inside `range` (everything when `None`), ascending by timestamp
    fn query_ordered(&self, key: &str, range: Option<&TimeRange>) -> Result<Series<P>>;

    /// Point stamped exactly at `ts`
    fn query_exact(&self, key: &str, ts: Timestamp) -> Result<Option<P>>;

    /// Earliest point strictly after `ts`
    fn query_greater(&self, key: &str, ts: Timestamp) -> Result<Option<P>>;

    /// Latest point strictly before `ts`
    fn query_less(&self, key: &str, ts: Timestamp) -> Result<Option<P>>;
}

/// A store holding both equity bars and exchange rates
pub trait PriceRepository:
    OrderedRepository<PricePoint> + OrderedRepository<ExchangeRatePoint>
{
    fn prices(&self, symbol: &str, range: Option<&TimeRange>) -> Result<Series<PricePoint>> {
        OrderedRepository::<PricePoint>::query_ordered(self, symbol, range)
    }

    fn rates(&self, pair: &str, range: Option<&TimeRange>) -> Result<Series<ExchangeRatePoint>> {
        OrderedRepository::<ExchangeRatePoint>::query_ordered(self, pair, range)
    }
}

impl<R> PriceRepository for R where
    R: OrderedRepository<PricePoint> + OrderedRepository<ExchangeRatePoint>
{
}
