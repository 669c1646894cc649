//! Price and exchange-rate storage access

pub mod fx;
pub mod in_memory;
pub mod repository;
#[cfg(feature = "rusqlite-support")]
pub mod sqlite;

pub use fx::{denormalize, normalize, ExchangeRateNormalizer};
pub use in_memory::InMemoryRepository;
pub use repository::{OrderedRepository, PriceRepository};
#[cfg(feature = "rusqlite-support")]
pub use sqlite::SqliteRepository;
