//! In-memory repository
//!
//! Holds one ordered [`Series`] per symbol and per currency pair. Used for
//! tests, benchmarks and CSV snapshots.

use super::repository::OrderedRepository;
use crate::error::{MetricsError, Result};
use crate::resolver;
use crate::types::{
    parse_timestamp, ExchangeRatePoint, PricePoint, Series, TimePoint, TimeRange, Timestamp,
};
use hashbrown::HashMap;
use serde::Deserialize;
use std::io::Read;

/// In-memory price and exchange-rate storage
///
/// # Example
/// ```
/// use stock_metrics::data::{InMemoryRepository, PriceRepository};
/// use stock_metrics::types::PricePoint;
/// use chrono::{TimeZone, Utc};
///
/// let mut repo = InMemoryRepository::new();
/// let dt = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
/// repo.add_price(PricePoint::new("F", dt, 9.0, 9.5, 8.8, 9.2, Some(1_000.0)));
///
/// let series = repo.prices("F", None).unwrap();
/// assert_eq!(series.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    prices: HashMap<String, Series<PricePoint>>,
    rates: HashMap<String, Series<ExchangeRatePoint>>,
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    symbol: String,
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    symbol: String,
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_price(&mut self, point: PricePoint) {
        self.prices
            .entry(point.symbol.clone())
            .or_insert_with(|| Series::empty(point.symbol.clone()))
            .insert(point);
    }

    pub fn add_prices(&mut self, points: impl IntoIterator<Item = PricePoint>) {
        for point in points {
            self.add_price(point);
        }
    }

    pub fn add_rate(&mut self, point: ExchangeRatePoint) {
        self.rates
            .entry(point.pair.clone())
            .or_insert_with(|| Series::empty(point.pair.clone()))
            .insert(point);
    }

    pub fn add_rates(&mut self, points: impl IntoIterator<Item = ExchangeRatePoint>) {
        for point in points {
            self.add_rate(point);
        }
    }

    /// Load equity bars from CSV with header `symbol,datetime,open,high,low,close[,volume]`
    pub fn load_prices_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut count = 0;
        for (line, record) in csv_reader.deserialize::<PriceRecord>().enumerate() {
            let record = record?;
            let timestamp = parse_timestamp(&record.datetime).map_err(|e| {
                MetricsError::InvalidArgument(format!("Row {}: {}", line + 1, e))
            })?;
            self.add_price(PricePoint::new(
                record.symbol,
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
            count += 1;
        }
        Ok(count)
    }

    /// Load exchange rates from CSV with header `symbol,datetime,open,high,low,close`
    pub fn load_rates_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut count = 0;
        for (line, record) in csv_reader.deserialize::<RateRecord>().enumerate() {
            let record = record?;
            let timestamp = parse_timestamp(&record.datetime).map_err(|e| {
                MetricsError::InvalidArgument(format!("Row {}: {}", line + 1, e))
            })?;
            self.add_rate(ExchangeRatePoint::new(
                record.symbol,
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
            ));
            count += 1;
        }
        Ok(count)
    }

    pub fn num_symbols(&self) -> usize {
        self.prices.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.rates.len()
    }

    /// Total number of stored points (prices and rates)
    pub fn num_entries(&self) -> usize {
        self.prices.values().map(Series::len).sum::<usize>()
            + self.rates.values().map(Series::len).sum::<usize>()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
        self.rates.clear();
    }
}

fn ordered<P: TimePoint>(
    store: &HashMap<String, Series<P>>,
    key: &str,
    range: Option<&TimeRange>,
) -> Series<P> {
    match (store.get(key), range) {
        (None, _) => Series::empty(key),
        (Some(series), None) => series.clone(),
        (Some(series), Some(range)) => series.window(range),
    }
}

fn lookup<'a, P: TimePoint>(
    store: &'a HashMap<String, Series<P>>,
    key: &str,
    ts: Timestamp,
    find: fn(&'a Series<P>, Timestamp) -> Option<&'a P>,
) -> Option<P> {
    store.get(key).and_then(|series| find(series, ts)).cloned()
}

impl OrderedRepository<PricePoint> for InMemoryRepository {
    fn query_ordered(&self, key: &str, range: Option<&TimeRange>) -> Result<Series<PricePoint>> {
        Ok(ordered(&self.prices, key, range))
    }

    fn query_exact(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        Ok(lookup(&self.prices, key, ts, resolver::exact))
    }

    fn query_greater(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        Ok(lookup(&self.prices, key, ts, resolver::next_after))
    }

    fn query_less(&self, key: &str, ts: Timestamp) -> Result<Option<PricePoint>> {
        Ok(lookup(&self.prices, key, ts, resolver::prev_before))
    }
}

impl OrderedRepository<ExchangeRatePoint> for InMemoryRepository {
    fn query_ordered(
        &self,
        key: &str,
        range: Option<&TimeRange>,
    ) -> Result<Series<ExchangeRatePoint>> {
        Ok(ordered(&self.rates, key, range))
    }

    fn query_exact(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        Ok(lookup(&self.rates, key, ts, resolver::exact))
    }

    fn query_greater(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        Ok(lookup(&self.rates, key, ts, resolver::next_after))
    }

    fn query_less(&self, key: &str, ts: Timestamp) -> Result<Option<ExchangeRatePoint>> {
        Ok(lookup(&self.rates, key, ts, resolver::prev_before))
    }
}
