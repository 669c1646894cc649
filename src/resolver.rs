//! Nearest-timestamp resolution over ordered series
//!
//! An exact match always wins. Otherwise the closer of the latest point
//! strictly before the target and the earliest point strictly after it is
//! chosen; on equal distance the earlier point is returned.

use crate::data::repository::OrderedRepository;
use crate::error::{MetricsError, Result};
use crate::types::{Series, TimePoint, Timestamp};
use chrono::Duration;

/// Point whose timestamp equals `target`, if any
pub fn exact<P: TimePoint>(series: &Series<P>, target: Timestamp) -> Option<&P> {
    let points = series.points();
    let idx = points.partition_point(|p| p.timestamp() < target);
    points.get(idx).filter(|p| p.timestamp() == target)
}

/// Earliest point with a timestamp strictly after `target`
pub fn next_after<P: TimePoint>(series: &Series<P>, target: Timestamp) -> Option<&P> {
    let points = series.points();
    let idx = points.partition_point(|p| p.timestamp() <= target);
    points.get(idx)
}

/// Latest point with a timestamp strictly before `target`
pub fn prev_before<P: TimePoint>(series: &Series<P>, target: Timestamp) -> Option<&P> {
    let points = series.points();
    let idx = points.partition_point(|p| p.timestamp() < target);
    idx.checked_sub(1).and_then(|i| points.get(i))
}

/// Point of `series` closest in time to `target`
pub fn resolve<P: TimePoint>(series: &Series<P>, target: Timestamp) -> Result<&P> {
    if let Some(point) = exact(series, target) {
        return Ok(point);
    }

    closer(target, prev_before(series, target), next_after(series, target))
        .ok_or_else(|| not_found(series.key(), target))
}

/// Same selection as [`resolve`], answered by the repository's point queries
pub fn resolve_in<P, R>(repository: &R, key: &str, target: Timestamp) -> Result<P>
where
    P: TimePoint,
    R: OrderedRepository<P> + ?Sized,
{
    if let Some(point) = repository.query_exact(key, target)? {
        return Ok(point);
    }

    let lt = repository.query_less(key, target)?;
    let gt = repository.query_greater(key, target)?;
    closer(target, lt, gt).ok_or_else(|| not_found(key, target))
}

fn closer<P: TimePoint>(target: Timestamp, lt: Option<P>, gt: Option<P>) -> Option<P> {
    // None stands for an infinite distance
    let gap = |p: &Option<P>| p.as_ref().map(|p| distance(p, target));

    match (gap(&lt), gap(&gt)) {
        (_, None) => lt,
        (None, Some(_)) => gt,
        (Some(lt_diff), Some(gt_diff)) => {
            if gt_diff < lt_diff {
                gt
            } else {
                lt
            }
        }
    }
}

fn not_found(key: &str, target: Timestamp) -> MetricsError {
    MetricsError::NotFound(format!("No data point for {} near {}", key, target))
}

/// Absolute distance between a point and a target
pub fn distance<P: TimePoint>(point: &P, target: Timestamp) -> Duration {
    (point.timestamp() - target).abs()
}
