//! Service configuration
//!
//! Read from TOML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration:
//!
//! ```toml
//! database = "stock.sqlite"
//! base_currency = "USD"
//! benchmark = "^GSPC"
//! sharpe_start = "2019-01-01"
//! sharpe_end = "2019-12-31"
//! ```

use crate::currency::Currency;
use crate::error::{MetricsError, Result};
use crate::types::TimeRange;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the `stocks` and `currencies` tables
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Currency the stored prices are quoted in
    #[serde(default = "default_base_currency")]
    pub base_currency: Currency,
    /// Index symbol Sharpe ratios are measured against
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
    #[serde(default = "default_sharpe_start")]
    pub sharpe_start: NaiveDate,
    #[serde(default = "default_sharpe_end")]
    pub sharpe_end: NaiveDate,
}

fn default_database() -> PathBuf {
    PathBuf::from("stock.sqlite")
}

fn default_base_currency() -> Currency {
    Currency::USD
}

fn default_benchmark() -> String {
    "^GSPC".to_string()
}

fn default_sharpe_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default()
}

fn default_sharpe_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 12, 31).unwrap_or_default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            base_currency: default_base_currency(),
            benchmark: default_benchmark(),
            sharpe_start: default_sharpe_start(),
            sharpe_end: default_sharpe_end(),
        }
    }
}

impl Config {
    /// `~/.stock-metrics/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".stock-metrics").join("config.toml"))
    }

    /// Load `path` if given (it must exist), else the default location if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => {
                    log::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MetricsError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| MetricsError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.benchmark.trim().is_empty() {
            return Err(MetricsError::ConfigError(
                "benchmark symbol must not be empty".to_string(),
            ));
        }
        if self.sharpe_start > self.sharpe_end {
            return Err(MetricsError::ConfigError(format!(
                "sharpe_start {} is after sharpe_end {}",
                self.sharpe_start, self.sharpe_end
            )));
        }
        Ok(())
    }

    /// Sharpe window from the start of `sharpe_start` to the end of `sharpe_end` (UTC)
    pub fn sharpe_range(&self) -> Result<TimeRange> {
        let start = self
            .sharpe_start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt));
        let end = self
            .sharpe_end
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .map(|dt| Utc.from_utc_datetime(&dt));
        match (start, end) {
            (Some(s), Some(e)) => TimeRange::between(s, e),
            _ => Err(MetricsError::ConfigError(
                "Invalid Sharpe window".to_string(),
            )),
        }
    }
}
