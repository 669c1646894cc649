//! Request-shaped operations over a price repository
//!
//! `MetricsService` validates symbols and currency codes, reads the series it
//! needs through the repository and hands immutable snapshots to the
//! calculators. Batch requests read sequentially and compute on the rayon pool.

use crate::asset::Company;
use crate::config::Config;
use crate::currency::Currency;
use crate::data::fx::{normalize, ExchangeRateNormalizer};
use crate::data::repository::PriceRepository;
use crate::error::Result;
use crate::metrics::{cagr, sharpe, CagrResult, Period};
use crate::types::{PricePoint, Series, TimeRange, Timestamp};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of a price response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One list of bars across all requested symbols
    #[default]
    Flat,
    /// Bars grouped per symbol with the company name
    Grouped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPrices {
    pub full_name: String,
    pub values: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PricesResponse {
    List(Vec<PricePoint>),
    Grouped(BTreeMap<String, CompanyPrices>),
}

impl PricesResponse {
    /// Total bars in the response
    pub fn len(&self) -> usize {
        match self {
            PricesResponse::List(points) => points.len(),
            PricesResponse::Grouped(groups) => groups.values().map(|g| g.values.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CagrResponse {
    Single(CagrResult),
    Batch(BTreeMap<String, CagrResult>),
}

/// Metrics engine bound to one repository and configuration
pub struct MetricsService<'a, R: PriceRepository + ?Sized> {
    repository: &'a R,
    config: Config,
}

impl<'a, R: PriceRepository + ?Sized> MetricsService<'a, R> {
    pub fn new(repository: &'a R, config: Config) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prices of one symbol (or every tracked company) expressed in `currency`
    pub fn get_prices(
        &self,
        symbol: Option<&str>,
        currency: &str,
        mode: OutputMode,
    ) -> Result<PricesResponse> {
        let target: Currency = currency.parse()?;
        let companies = companies_for(symbol)?;
        log::info!(
            "Fetching prices for {} symbol(s) in {}",
            companies.len(),
            target
        );

        let normalizer = ExchangeRateNormalizer::new(self.repository, self.config.base_currency);
        let rates = normalizer.rates_for(target)?;

        let mut grouped = BTreeMap::new();
        let mut flat = Vec::new();
        for company in companies {
            let series = self.repository.prices(company.ticker(), None)?;
            let series = match &rates {
                Some(r) => normalize(&series, r)?,
                None => series,
            };
            log::debug!("{}: {} bars", company.ticker(), series.len());

            match mode {
                OutputMode::Flat => flat.extend(series.into_points()),
                OutputMode::Grouped => {
                    grouped.insert(
                        company.ticker().to_string(),
                        CompanyPrices {
                            full_name: company.full_name().to_string(),
                            values: series.into_points(),
                        },
                    );
                }
            }
        }

        Ok(match mode {
            OutputMode::Flat => PricesResponse::List(flat),
            OutputMode::Grouped => PricesResponse::Grouped(grouped),
        })
    }

    /// CAGR of one symbol, or of every tracked company, ending near `as_of`
    pub fn get_cagr(
        &self,
        symbol: Option<&str>,
        period: &str,
        as_of: Timestamp,
    ) -> Result<CagrResponse> {
        let period: Period = period.parse()?;

        if let Some(s) = symbol {
            let company: Company = s.parse()?;
            let series = self.repository.prices(company.ticker(), None)?;
            log::info!("Computing {}-year CAGR for {}", period, company);
            return cagr::compute(&series, period, as_of).map(CagrResponse::Single);
        }

        let all = self.read_all(&Company::ALL, None)?;
        log::info!("Computing {}-year CAGR for {} symbols", period, all.len());
        let results = all
            .par_iter()
            .map(|(ticker, series)| {
                cagr::compute(series, period, as_of).map(|r| (ticker.clone(), r))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(CagrResponse::Batch(results))
    }

    /// Annualized Sharpe ratio per symbol against the configured benchmark and window
    pub fn get_sharpe<S: AsRef<str>>(&self, symbols: Option<&[S]>) -> Result<BTreeMap<String, f64>> {
        Ok(self
            .sharpe_ratios(symbols)?
            .into_iter()
            .map(|(ticker, ratio)| (ticker, ratio.annualized))
            .collect())
    }

    /// Full Sharpe records per symbol
    pub fn sharpe_ratios<S: AsRef<str>>(
        &self,
        symbols: Option<&[S]>,
    ) -> Result<BTreeMap<String, sharpe::SharpeRatio>> {
        let companies = Company::parse_many(symbols)?;
        let range = self.config.sharpe_range()?;

        let benchmark = self
            .repository
            .prices(&self.config.benchmark, Some(&range))?;
        log::info!(
            "Computing Sharpe ratios for {} symbol(s) against {} ({} bars)",
            companies.len(),
            self.config.benchmark,
            benchmark.len()
        );

        let all = self.read_all(&companies, Some(&range))?;
        all.par_iter()
            .map(|(ticker, series)| sharpe::compute(series, &benchmark).map(|r| (ticker.clone(), r)))
            .collect()
    }

    fn read_all(
        &self,
        companies: &[Company],
        range: Option<&TimeRange>,
    ) -> Result<Vec<(String, Series<PricePoint>)>> {
        companies
            .iter()
            .map(|c| {
                let series = self.repository.prices(c.ticker(), range)?;
                Ok((c.ticker().to_string(), series))
            })
            .collect()
    }
}

fn companies_for(symbol: Option<&str>) -> Result<Vec<Company>> {
    match symbol {
        Some(s) => Ok(vec![s.parse()?]),
        None => Ok(Company::ALL.to_vec()),
    }
}
