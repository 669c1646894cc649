//! Tracked equities

use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of companies the service tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Company {
    Apple,
    Amazon,
    Ford,
    Alphabet,
    Microsoft,
    Tesla,
}

impl Company {
    pub const ALL: [Company; 6] = [
        Company::Apple,
        Company::Amazon,
        Company::Ford,
        Company::Alphabet,
        Company::Microsoft,
        Company::Tesla,
    ];

    /// Ticker as stored in the `stocks` table
    pub fn ticker(&self) -> &'static str {
        match self {
            Company::Apple => "AAPL",
            Company::Amazon => "AMZN",
            Company::Ford => "F",
            Company::Alphabet => "GOOGL",
            Company::Microsoft => "MSFT",
            Company::Tesla => "TSLA",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Company::Apple => "Apple Inc.",
            Company::Amazon => "Amazon.com, Inc.",
            Company::Ford => "Ford Motor Company",
            Company::Alphabet => "Alphabet Inc.",
            Company::Microsoft => "Microsoft Corporation",
            Company::Tesla => "Tesla, Inc.",
        }
    }

    pub fn from_ticker(ticker: &str) -> Option<Self> {
        match ticker.trim().to_uppercase().as_str() {
            "AAPL" => Some(Company::Apple),
            "AMZN" => Some(Company::Amazon),
            "F" => Some(Company::Ford),
            "GOOGL" => Some(Company::Alphabet),
            "MSFT" => Some(Company::Microsoft),
            "TSLA" => Some(Company::Tesla),
            _ => None,
        }
    }

    /// Resolve an optional list of tickers; `None` means every tracked company
    pub fn parse_many<S: AsRef<str>>(tickers: Option<&[S]>) -> Result<Vec<Company>> {
        match tickers {
            None => Ok(Company::ALL.to_vec()),
            Some(list) => {
                let mut companies = list
                    .iter()
                    .map(|t| t.as_ref().parse())
                    .collect::<Result<Vec<Company>>>()?;
                companies.sort();
                companies.dedup();
                Ok(companies)
            }
        }
    }
}

impl FromStr for Company {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Company::from_ticker(s)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("Unknown symbol: {}", s)))
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticker())
    }
}
