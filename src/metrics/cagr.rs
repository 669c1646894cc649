//! Compound annual growth rate

use super::round_to;
use crate::error::{MetricsError, Result};
use crate::resolver;
use crate::types::{PricePoint, Series, Timestamp};
use chrono::{Datelike, Months, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Look-back period for CAGR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// Fixed number of years before the end point
    Years(i64),
    /// Whole years spanned by the series
    All,
}

impl FromStr for Period {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }
        s.parse::<i64>().map(Period::Years).map_err(|_| {
            MetricsError::InvalidArgument(format!(
                "Period must be a number of years or \"all\", got: {}",
                s
            ))
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Years(n) => write!(f, "{}", n),
            Period::All => write!(f, "all"),
        }
    }
}

/// CAGR over one resolved start/end pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CagrResult {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Open of the start bar
    pub first_value: f64,
    /// Close of the end bar
    pub last_value: f64,
    pub num_of_years: i64,
    /// Percentage, two decimals
    #[serde(rename = "CAGR")]
    pub cagr: f64,
}

/// CAGR of `series` for `period`, ending at the bar nearest `reference_time`
pub fn compute(
    series: &Series<PricePoint>,
    period: Period,
    reference_time: Timestamp,
) -> Result<CagrResult> {
    let end = resolver::resolve(series, reference_time)?;

    let n_years = match period {
        Period::Years(n) => n,
        Period::All => span_years(series)?,
    };
    if n_years <= 0 {
        return Err(MetricsError::InvalidArgument(format!(
            "CAGR needs a positive number of years, got {} for {}",
            n_years,
            series.key()
        )));
    }

    let start = resolver::resolve(series, years_before(end.timestamp, n_years)?)?;
    if start.open == 0.0 {
        return Err(MetricsError::DivisionByZero(format!(
            "{} opens at zero on {}",
            series.key(),
            start.timestamp
        )));
    }

    let growth = (end.close / start.open).powf(1.0 / n_years as f64) - 1.0;

    Ok(CagrResult {
        start_date: start.timestamp,
        end_date: end.timestamp,
        first_value: start.open,
        last_value: end.close,
        num_of_years: n_years,
        cagr: round_to(growth * 100.0, 2),
    })
}

/// Whole years between the first and last bar
fn span_years(series: &Series<PricePoint>) -> Result<i64> {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => Ok(whole_years_between(first.timestamp, last.timestamp)),
        _ => Err(MetricsError::NotFound(format!(
            "No data points for {}",
            series.key()
        ))),
    }
}

/// Completed calendar years from `from` to `to`; negative when `to` precedes `from`
pub fn whole_years_between(from: Timestamp, to: Timestamp) -> i64 {
    if to < from {
        return -whole_years_between(to, from);
    }
    let mut years = i64::from(to.year() - from.year());
    let anniversary_reached = (to.month(), to.day(), to.num_seconds_from_midnight(), to.nanosecond())
        >= (from.month(), from.day(), from.num_seconds_from_midnight(), from.nanosecond());
    if !anniversary_reached {
        years -= 1;
    }
    years
}

/// `ts` moved back by `years` calendar years (Feb 29 lands on Feb 28)
pub fn years_before(ts: Timestamp, years: i64) -> Result<Timestamp> {
    u32::try_from(years)
        .ok()
        .and_then(|y| y.checked_mul(12))
        .and_then(|months| ts.checked_sub_months(Months::new(months)))
        .ok_or_else(|| {
            MetricsError::InvalidArgument(format!("Cannot go back {} years from {}", years, ts))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn bar(t: Timestamp, open: f64, close: f64) -> PricePoint {
        PricePoint::new("X", t, open, open.max(close), open.min(close), close, Some(1.0))
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert_eq!("ALL".parse::<Period>().unwrap(), Period::All);
        assert_eq!("5".parse::<Period>().unwrap(), Period::Years(5));
        assert!(matches!(
            "five".parse::<Period>(),
            Err(MetricsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_doubling_over_one_year() {
        let series = Series::new(
            "X",
            vec![bar(ts(2019, 1, 1), 100.0, 100.0), bar(ts(2020, 1, 1), 200.0, 200.0)],
        )
        .unwrap();
        let result = compute(&series, Period::Years(1), ts(2020, 1, 1)).unwrap();
        assert_eq!(result.cagr, 100.0);
        assert_eq!(result.num_of_years, 1);
    }

    #[test]
    fn test_fifty_percent() {
        let series = Series::new(
            "X",
            vec![bar(ts(2019, 1, 1), 100.0, 100.0), bar(ts(2020, 1, 1), 100.0, 150.0)],
        )
        .unwrap();
        let result = compute(&series, Period::Years(1), ts(2020, 1, 1)).unwrap();
        assert_eq!(result.first_value, 100.0);
        assert_eq!(result.last_value, 150.0);
        assert_eq!(result.cagr, 50.0);
        assert_eq!(result.start_date, ts(2019, 1, 1));
        assert_eq!(result.end_date, ts(2020, 1, 1));
    }

    #[test]
    fn test_two_years_compounds() {
        let series = Series::new(
            "X",
            vec![
                bar(ts(2018, 1, 1), 100.0, 100.0),
                bar(ts(2019, 1, 1), 110.0, 110.0),
                bar(ts(2020, 1, 1), 121.0, 121.0),
            ],
        )
        .unwrap();
        let result = compute(&series, Period::Years(2), ts(2020, 6, 1)).unwrap();
        assert_eq!(result.cagr, 10.0);
    }

    #[test]
    fn test_all_uses_whole_year_span() {
        let series = Series::new(
            "X",
            vec![
                bar(ts(2015, 3, 10), 50.0, 50.0),
                bar(ts(2017, 3, 10), 70.0, 70.0),
                bar(ts(2020, 3, 9), 80.0, 100.0),
            ],
        )
        .unwrap();
        let result = compute(&series, Period::All, ts(2021, 1, 1)).unwrap();
        assert_eq!(result.num_of_years, 4);
        // 2020-03-09 minus 4 years is 2016-03-09, nearest bar is 2015-03-10
        assert_eq!(result.start_date, ts(2015, 3, 10));
    }

    #[test]
    fn test_non_positive_years_rejected() {
        let series = Series::new("X", vec![bar(ts(2019, 1, 1), 1.0, 1.0)]).unwrap();
        for n in [0, -3] {
            let err = compute(&series, Period::Years(n), ts(2019, 1, 1)).unwrap_err();
            assert!(matches!(err, MetricsError::InvalidArgument(_)));
        }
        // a single bar spans zero years
        let err = compute(&series, Period::All, ts(2019, 1, 1)).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_open_is_division_by_zero() {
        let series = Series::new(
            "X",
            vec![bar(ts(2019, 1, 1), 0.0, 1.0), bar(ts(2020, 1, 1), 1.0, 2.0)],
        )
        .unwrap();
        let err = compute(&series, Period::Years(1), ts(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, MetricsError::DivisionByZero(_)));
    }

    #[test]
    fn test_empty_series_is_not_found() {
        let series: Series<PricePoint> = Series::empty("X");
        let err = compute(&series, Period::All, ts(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, MetricsError::NotFound(_)));
    }

    #[test]
    fn test_whole_years_between() {
        assert_eq!(whole_years_between(ts(2015, 3, 10), ts(2020, 3, 10)), 5);
        assert_eq!(whole_years_between(ts(2015, 3, 10), ts(2020, 3, 9)), 4);
        assert_eq!(whole_years_between(ts(2016, 2, 29), ts(2017, 2, 28)), 0);
        assert_eq!(whole_years_between(ts(2020, 3, 10), ts(2015, 3, 10)), -5);
    }

    #[test]
    fn test_years_before_clamps_leap_day() {
        assert_eq!(years_before(ts(2020, 2, 29), 1).unwrap(), ts(2019, 2, 28));
        assert_eq!(years_before(ts(2020, 6, 15), 3).unwrap(), ts(2017, 6, 15));
        assert!(years_before(ts(2020, 6, 15), -1).is_err());
    }
}
