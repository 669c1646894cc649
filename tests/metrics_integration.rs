//! End-to-end metric checks over repositories

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use stock_metrics::error::MetricsError;
use stock_metrics::metrics::{cagr, sharpe, Period};
use stock_metrics::prelude::*;

fn ts(y: i32, m: u32, d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[test]
fn test_cagr_fifty_percent_end_to_end() {
    let mut repo = InMemoryRepository::new();
    repo.add_price(PricePoint::new("AAPL", ts(2018, 3, 1), 100.0, 100.0, 100.0, 100.0, None));
    repo.add_price(PricePoint::new("AAPL", ts(2019, 3, 1), 100.0, 150.0, 100.0, 150.0, None));

    let series = repo.prices("AAPL", None).unwrap();
    let result = cagr::compute(&series, Period::Years(1), ts(2019, 3, 1)).unwrap();

    assert_eq!(result.first_value, 100.0);
    assert_eq!(result.last_value, 150.0);
    assert_eq!(result.cagr, 50.0);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["CAGR"], 50.0);
    assert_eq!(json["first_value"], 100.0);
    assert_eq!(json["num_of_years"], 1);
}

#[test]
fn test_cagr_doubling_is_one_hundred() {
    let series = Series::new(
        "MSFT",
        vec![
            PricePoint::new("MSFT", ts(2017, 6, 1), 50.0, 50.0, 50.0, 50.0, None),
            PricePoint::new("MSFT", ts(2018, 6, 1), 90.0, 100.0, 90.0, 100.0, None),
        ],
    )
    .unwrap();
    let result = cagr::compute(&series, Period::Years(1), ts(2018, 6, 1)).unwrap();
    assert_eq!(result.cagr, 100.0);
}

#[test]
fn test_cagr_reference_time_resolves_to_nearest_bar() {
    let points: Vec<PricePoint> = (0..=3)
        .map(|y| {
            let v = 100.0 * 1.1f64.powi(y);
            PricePoint::new("F", ts(2016 + y, 1, 4), v, v, v, v, None)
        })
        .collect();
    let series = Series::new("F", points).unwrap();

    // 2019-02-01 is nearest to the 2019-01-04 bar; three years earlier lands on 2016-01-04
    let result = cagr::compute(&series, Period::Years(3), ts(2019, 2, 1)).unwrap();
    assert_eq!(result.end_date, ts(2019, 1, 4));
    assert_eq!(result.start_date, ts(2016, 1, 4));
    assert_eq!(result.cagr, 10.0);
}

#[test]
fn test_cagr_non_positive_years() {
    let series = Series::new(
        "F",
        vec![PricePoint::new("F", ts(2019, 1, 1), 1.0, 1.0, 1.0, 1.0, None)],
    )
    .unwrap();
    for years in ["0", "-1"] {
        let period: Period = years.parse().unwrap();
        assert!(matches!(
            cagr::compute(&series, period, ts(2019, 1, 1)),
            Err(MetricsError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_sharpe_against_benchmark_from_csv() {
    let mut csv = String::from("symbol,datetime,open,high,low,close,volume\n");
    let stock = [100.0, 101.0, 100.5, 102.0, 103.5, 103.0];
    let bench = [50.0, 50.2, 50.1, 50.6, 50.9, 51.0];
    for (i, (s, b)) in stock.iter().zip(bench.iter()).enumerate() {
        let day = ts(2019, 3, 4) + Duration::days(i as i64);
        let dt = day.format("%Y-%m-%d %H:%M:%S");
        csv.push_str(&format!("GOOGL,{dt},{s},{s},{s},{s},1000\n"));
        csv.push_str(&format!("^GSPC,{dt},{b},{b},{b},{b},\n"));
    }

    let mut repo = InMemoryRepository::new();
    assert_eq!(repo.load_prices_csv(csv.as_bytes()).unwrap(), 12);

    let googl = repo.prices("GOOGL", None).unwrap();
    let gspc = repo.prices("^GSPC", None).unwrap();
    let ratio = sharpe::compute(&googl, &gspc).unwrap();

    let excess: Vec<f64> = (1..stock.len())
        .map(|i| {
            (stock[i] - stock[i - 1]) / stock[i - 1] - (bench[i] - bench[i - 1]) / bench[i - 1]
        })
        .collect();
    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let std = (excess.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

    assert_eq!(ratio.observations, 5);
    assert_relative_eq!(ratio.daily, mean / std, epsilon = 1e-12);
    assert_relative_eq!(
        ratio.annualized,
        (mean / std * 252f64.sqrt() * 1000.0).round() / 1000.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_sharpe_identical_series_fails() {
    let closes = [10.0, 10.5, 10.2, 10.8];
    let points = |sym: &str| -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(sym, ts(2019, 5, 1) + Duration::days(i as i64), c, c, c, c, None))
            .collect()
    };
    let stock = Series::new("AMZN", points("AMZN")).unwrap();
    let bench = Series::new("^GSPC", points("^GSPC")).unwrap();
    assert!(matches!(
        sharpe::compute(&stock, &bench),
        Err(MetricsError::DivisionByZero(_))
    ));
}

#[test]
fn test_sharpe_single_point_fails() {
    let one = Series::new(
        "AMZN",
        vec![PricePoint::new("AMZN", ts(2019, 5, 1), 1.0, 1.0, 1.0, 1.0, None)],
    )
    .unwrap();
    let bench = Series::new(
        "^GSPC",
        (0..5)
            .map(|i| PricePoint::new("^GSPC", ts(2019, 5, 1) + Duration::days(i), 1.0, 1.0, 1.0, 1.0 + i as f64, None))
            .collect(),
    )
    .unwrap();
    let err = sharpe::compute(&one, &bench).unwrap_err();
    assert!(matches!(err, MetricsError::InsufficientData(_)));
    assert_eq!(err.status_code(), 422);
}
