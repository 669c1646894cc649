//! SQLite repository and service integration

use chrono::{Duration, TimeZone, Utc};
use stock_metrics::error::MetricsError;
use stock_metrics::prelude::*;
use stock_metrics::resolver;
use tempfile::tempdir;

fn day(i: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap() + Duration::days(i)
}

fn seed(repo: &mut SqliteRepository) {
    let mut bars = Vec::new();
    for (k, company) in Company::ALL.iter().enumerate() {
        for i in 0..365 {
            let base = 50.0 + 10.0 * k as f64;
            let close = base * (1.0 + 0.0005 * i as f64) * if i % 4 == 0 { 1.02 } else { 0.995 };
            bars.push(PricePoint::new(company.ticker(), day(i), close, close, close, close, Some(1e5)));
        }
    }
    for i in 0..365 {
        let close = 2500.0 + i as f64;
        bars.push(PricePoint::new("^GSPC", day(i), close, close, close, close, None));
    }
    repo.insert_prices(&bars).unwrap();

    let rates: Vec<ExchangeRatePoint> = (0..365)
        .step_by(5)
        .map(|i| ExchangeRatePoint::new("EURUSD", day(i) + Duration::hours(12), 1.1, 1.1, 1.1, 1.1))
        .collect();
    repo.insert_rates(&rates).unwrap();
}

#[test]
fn test_file_database_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stock.sqlite");
    {
        let mut repo = SqliteRepository::new(&path).unwrap();
        seed(&mut repo);
    }

    let repo = SqliteRepository::new(&path).unwrap();
    let (prices, rates) = repo.count().unwrap();
    assert_eq!(prices, 365 * (Company::ALL.len() + 1));
    assert_eq!(rates, 73);
    assert_eq!(repo.symbols().unwrap().len(), Company::ALL.len() + 1);
}

#[test]
fn test_resolve_in_matches_series_resolution() {
    let mut repo = SqliteRepository::new_in_memory().unwrap();
    seed(&mut repo);
    let rates = repo.rates("EURUSD", None).unwrap();

    for offset_hours in [0, 5, 12, 30, 60, 61, 72, 24 * 400] {
        let target = day(0) + Duration::hours(offset_hours);
        let from_db: ExchangeRatePoint = resolver::resolve_in(&repo, "EURUSD", target).unwrap();
        let from_series = resolver::resolve(&rates, target).unwrap();
        assert_eq!(from_db.timestamp, from_series.timestamp, "target {}", target);
    }

    // 72h sits halfway between the bars at 12h and 132h; the earlier one wins
    let tie: ExchangeRatePoint =
        resolver::resolve_in(&repo, "EURUSD", day(0) + Duration::hours(72)).unwrap();
    assert_eq!(tie.timestamp, day(0) + Duration::hours(12));
}

#[test]
fn test_resolve_in_unknown_key() {
    let repo = SqliteRepository::new_in_memory().unwrap();
    let err = resolver::resolve_in::<PricePoint, _>(&repo, "AAPL", day(0)).unwrap_err();
    assert!(matches!(err, MetricsError::NotFound(_)));
}

#[test]
fn test_service_over_sqlite() {
    let mut repo = SqliteRepository::new_in_memory().unwrap();
    seed(&mut repo);
    let service = MetricsService::new(&repo, Config::default());

    let usd = service.get_prices(Some("GOOGL"), "USD", OutputMode::Flat).unwrap();
    let eur = service.get_prices(Some("GOOGL"), "EUR", OutputMode::Flat).unwrap();
    match (usd, eur) {
        (PricesResponse::List(usd), PricesResponse::List(eur)) => {
            assert_eq!(usd.len(), 365);
            assert_eq!(eur.len(), 365);
            assert!((usd[10].open / 1.1 - eur[10].open).abs() < 1e-9);
            assert_eq!(usd[10].volume, eur[10].volume);
        }
        other => panic!("unexpected response {:?}", other),
    }

    match service.get_cagr(None, "1", day(364)).unwrap() {
        CagrResponse::Batch(results) => {
            assert_eq!(results.len(), Company::ALL.len());
            assert!(results.values().all(|r| r.start_date == day(0)));
            assert!(results.values().all(|r| r.end_date == day(364)));
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_service_cagr_all_rejects_short_history() {
    let mut repo = SqliteRepository::new_in_memory().unwrap();
    seed(&mut repo);
    let service = MetricsService::new(&repo, Config::default());
    assert!(matches!(
        service.get_cagr(Some("F"), "all", day(364)),
        Err(MetricsError::InvalidArgument(_))
    ));
    match service.get_cagr(Some("F"), "1", day(364)).unwrap() {
        CagrResponse::Single(r) => assert_eq!(r.start_date, day(0)),
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_sharpe_over_sqlite_window() {
    let mut repo = SqliteRepository::new_in_memory().unwrap();
    seed(&mut repo);
    // bars outside the configured window must not count
    repo.insert_price(&PricePoint::new("AAPL", day(400), 1.0, 1.0, 1.0, 1.0, None))
        .unwrap();
    let service = MetricsService::new(&repo, Config::default());

    let details = service.sharpe_ratios(Some(&["AAPL", "TSLA"][..])).unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details["AAPL"].observations, 364);
    assert!(details["TSLA"].annualized.is_finite());

    let flat = service.get_sharpe(Some(&["AAPL"][..])).unwrap();
    assert_eq!(flat["AAPL"], details["AAPL"].annualized);
}
