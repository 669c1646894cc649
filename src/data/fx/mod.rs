//! Currency normalization of price series
//!
//! Prices are stored in the base currency (USD). A request for another
//! currency aligns each price bar with the nearest exchange-rate bar of the
//! matching pair and divides field by field.
//!
//! # Example
//!
//! ```rust
//! use stock_metrics::data::fx::normalize;
//! use stock_metrics::types::{ExchangeRatePoint, PricePoint, Series};
//! use chrono::{TimeZone, Utc};
//!
//! let dt = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
//! let prices = Series::new("F", vec![PricePoint::new("F", dt, 11.0, 11.0, 11.0, 11.0, None)]).unwrap();
//! let rates = Series::new("EURUSD", vec![ExchangeRatePoint::new("EURUSD", dt, 1.1, 1.1, 1.1, 1.1)]).unwrap();
//!
//! let eur = normalize(&prices, &rates).unwrap();
//! assert!((eur.first().unwrap().close - 10.0).abs() < 1e-9);
//! ```

pub mod normalizer;

pub use normalizer::{denormalize, normalize, ExchangeRateNormalizer};
