//! # stock_metrics
//!
//! Historical equity prices and the metrics derived from them: nearest
//! timestamp lookup, currency normalization, CAGR and Sharpe ratio.
//!
//! Storage is reached only through the [`data::OrderedRepository`] trait.
//! The calculators are pure functions over immutable [`types::Series`]
//! snapshots; [`service::MetricsService`] wires them to a repository.
//!
//! ## Example
//!
//! ```rust
//! use stock_metrics::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2019, 1, 2, 0, 0, 0).unwrap();
//! let t1 = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
//!
//! let mut repo = InMemoryRepository::new();
//! repo.add_price(PricePoint::new("AAPL", t0, 100.0, 100.0, 100.0, 100.0, None));
//! repo.add_price(PricePoint::new("AAPL", t1, 100.0, 150.0, 100.0, 150.0, None));
//!
//! let service = MetricsService::new(&repo, Config::default());
//! match service.get_cagr(Some("AAPL"), "1", t1).unwrap() {
//!     CagrResponse::Single(result) => assert_eq!(result.cagr, 50.0),
//!     CagrResponse::Batch(_) => unreachable!(),
//! }
//! ```

pub mod asset;
pub mod config;
pub mod currency;
pub mod data;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod service;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::asset::Company;
    pub use crate::config::Config;
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::data::{InMemoryRepository, OrderedRepository, PriceRepository};
    #[cfg(feature = "rusqlite-support")]
    pub use crate::data::SqliteRepository;
    pub use crate::error::{MetricsError, Result};
    pub use crate::metrics::{CagrResult, Period, SharpeRatio};
    pub use crate::service::{CagrResponse, MetricsService, OutputMode, PricesResponse};
    pub use crate::types::*;
}
