//! Core types: price points, exchange-rate points and ordered series

use crate::error::{MetricsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Text layout of the `datetime` columns (naive UTC, microsecond precision)
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]` or a bare date (midnight UTC)
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| MetricsError::InvalidArgument(format!("Invalid timestamp: {}", s)))
}

/// Format a timestamp the way the `datetime` columns store it
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.naive_utc().format(DATETIME_FORMAT).to_string()
}

/// Price type
pub type Price = f64;

/// Anything sampled at a point in time
pub trait TimePoint: Clone + Send + Sync {
    /// Sample time
    fn timestamp(&self) -> Timestamp;

    /// Symbol or currency pair the sample belongs to
    fn key(&self) -> &str;
}

impl<P: TimePoint> TimePoint for &P {
    fn timestamp(&self) -> Timestamp {
        (**self).timestamp()
    }

    fn key(&self) -> &str {
        (**self).key()
    }
}

/// One OHLC(V) bar for one equity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl TimePoint for PricePoint {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn key(&self) -> &str {
        &self.symbol
    }
}

/// Benchmark index bars have the same shape as equity bars
pub type BenchmarkPoint = PricePoint;

/// Price of one currency in terms of another at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRatePoint {
    pub pair: String,
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl ExchangeRatePoint {
    pub fn new(
        pair: impl Into<String>,
        timestamp: Timestamp,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Self {
        Self {
            pair: pair.into(),
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

impl TimePoint for ExchangeRatePoint {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn key(&self) -> &str {
        &self.pair
    }
}

/// Inclusive time predicate for repository reads. Open on either side when `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl TimeRange {
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(MetricsError::InvalidArgument(format!(
                    "Range start {} is after end {}",
                    s, e
                )));
            }
        }
        Ok(Self { start, end })
    }

    /// Unbounded range
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: Timestamp, end: Timestamp) -> Result<Self> {
        Self::new(Some(start), Some(end))
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Points for one symbol or pair, non-decreasing by timestamp.
///
/// The ordering is checked on construction, so every algorithm working on a
/// `Series` may binary search it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<P> {
    key: String,
    points: Vec<P>,
}

impl<P: TimePoint> Series<P> {
    /// Build a series from points that are already in timestamp order
    pub fn new(key: impl Into<String>, points: Vec<P>) -> Result<Self> {
        let key = key.into();
        if let Some(pos) = points
            .windows(2)
            .position(|w| w[1].timestamp() < w[0].timestamp())
        {
            return Err(MetricsError::InvalidArgument(format!(
                "Series {} is out of order at index {}: {} precedes {}",
                key,
                pos + 1,
                points[pos + 1].timestamp(),
                points[pos].timestamp()
            )));
        }
        Ok(Self { key, points })
    }

    /// Build a series from points in any order (stable sort by timestamp)
    pub fn from_unsorted(key: impl Into<String>, mut points: Vec<P>) -> Self {
        points.sort_by_key(|p| p.timestamp());
        Self {
            key: key.into(),
            points,
        }
    }

    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            points: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Insert keeping timestamp order; lands after any points with an equal timestamp
    pub fn insert(&mut self, point: P) {
        let ts = point.timestamp();
        let idx = self.points.partition_point(|p| p.timestamp() <= ts);
        self.points.insert(idx, point);
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn into_points(self) -> Vec<P> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&P> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&P> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.points.iter()
    }

    /// Sub-series inside `range`, located by binary search
    pub fn window(&self, range: &TimeRange) -> Self {
        let lo = match range.start {
            Some(s) => self.points.partition_point(|p| p.timestamp() < s),
            None => 0,
        };
        let hi = match range.end {
            Some(e) => self.points.partition_point(|p| p.timestamp() <= e),
            None => self.points.len(),
        };
        Self {
            key: self.key.clone(),
            points: self.points[lo..hi.max(lo)].to_vec(),
        }
    }
}

impl<'a, P> IntoIterator for &'a Series<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
