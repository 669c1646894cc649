//! Currency types and exchange-rate pairs

use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported currencies (ISO 4217 codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::CAD,
        Currency::AUD,
    ];

    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Parse from ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CHF" => Some(Currency::CHF),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            _ => None,
        }
    }
}

impl FromStr for Currency {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Currency::from_code(s)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("Unknown currency: {}", s)))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Currency pair: price of one `base` unit expressed in `quote`.
///
/// `EURUSD` at 1.10 means one euro costs 1.10 dollars, so a dollar price
/// divided by that rate is the euro price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Pair needed to express `quote`-denominated prices in `target`
    pub fn for_target(target: Currency, quote: Currency) -> Self {
        Self::new(target, quote)
    }

    /// Storage symbol, e.g. `EURUSD`
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base.code(), self.quote.code())
    }

    /// Parse `EUR/USD` or `EURUSD`
    pub fn from_string(s: &str) -> Result<Self> {
        let s = s.trim();
        let (base, quote) = if let Some((b, q)) = s.split_once('/') {
            (b, q)
        } else if s.len() == 6 && s.is_ascii() {
            s.split_at(3)
        } else {
            return Err(MetricsError::InvalidArgument(format!(
                "Invalid currency pair format: {}",
                s
            )));
        };
        Ok(Self::new(base.parse()?, quote.parse()?))
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::from_code("gbp"), Some(Currency::GBP));
        assert_eq!(Currency::from_code("XXX"), None);
    }

    #[test]
    fn test_currency_parse_unknown_is_invalid_argument() {
        let err = "BTC".parse::<Currency>().unwrap_err();
        assert!(matches!(err, MetricsError::InvalidArgument(_)));
    }

    #[test]
    fn test_every_currency_round_trips_through_code() {
        for c in Currency::ALL {
            assert_eq!(c.code().parse::<Currency>().unwrap(), c);
        }
    }

    #[test]
    fn test_pair_symbol_and_parse() {
        let pair = CurrencyPair::for_target(Currency::EUR, Currency::USD);
        assert_eq!(pair.symbol(), "EURUSD");
        assert_eq!(pair.to_string(), "EUR/USD");
        assert_eq!(CurrencyPair::from_string("EURUSD").unwrap(), pair);
        assert_eq!(CurrencyPair::from_string("eur/usd").unwrap(), pair);
        assert!(CurrencyPair::from_string("EURO").is_err());
    }
}
