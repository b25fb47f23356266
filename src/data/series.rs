//! Time-series backfill.
//!
//! The subgraph only writes a day (or hour) snapshot when something happened
//! in that bucket. Charts need one point per bucket, so missing buckets are
//! synthesized by carrying forward the last observed stock values (reserves,
//! liquidity, cumulative totals) and zeroing flow values (volumes).

use rustc_hash::FxHashMap;

use crate::{
    models::{GlobalDayData, WeeklyVolume},
    utils::{align_down, iso_week},
};

/// A point of a bucketed time series.
pub trait SeriesPoint: Clone {
    fn timestamp(&self) -> i64;

    /// Synthesize the point for an empty bucket at `timestamp`, following `self`.
    fn carry_forward(&self, timestamp: i64) -> Self;
}

/// Fill every missing bucket between the first observed point and the bucket
/// before `end`.
///
/// The output has exactly one point per `step`-sized bucket, in strictly
/// increasing order, covering `[first observed bucket, max(last observed
/// bucket, align(end - step))]`. When two observations fall in the same bucket
/// the later one in input order wins. Points without a date (timestamp
/// `<= 0`) are dropped.
pub fn fill_gaps<P: SeriesPoint>(points: Vec<P>, step: i64, end: i64) -> Vec<P> {
    if points.is_empty() || step <= 0 {
        return points;
    }

    let mut by_bucket: FxHashMap<i64, P> = FxHashMap::default();
    for point in points.into_iter().filter(|p| p.timestamp() > 0) {
        by_bucket.insert(point.timestamp().div_euclid(step), point);
    }

    if by_bucket.is_empty() {
        return Vec::new();
    }

    let first = by_bucket.keys().copied().min().unwrap_or_default();
    let last_observed = by_bucket.keys().copied().max().unwrap_or_default();
    let last = last_observed.max(align_down(end - step, step).div_euclid(step));

    let mut filled: Vec<P> = Vec::with_capacity((last - first + 1) as usize);
    for bucket in first..=last {
        let point = match by_bucket.remove(&bucket) {
            Some(observed) => observed,
            None => match filled.last() {
                Some(previous) => previous.carry_forward(bucket * step),
                None => continue,
            },
        };
        filled.push(point);
    }

    filled
}

/// Re-aggregate daily volumes into weekly buckets.
///
/// A new bucket starts whenever the ISO week number differs from the previous
/// day's. The bucket date is the last day it contains.
pub fn aggregate_weekly(days: &[GlobalDayData]) -> Vec<WeeklyVolume> {
    let mut weekly: Vec<WeeklyVolume> = Vec::new();
    let mut current_week: Option<u32> = None;

    for day in days {
        let week = iso_week(day.date);
        if current_week != Some(week) {
            current_week = Some(week);
            weekly.push(WeeklyVolume::default());
        }
        if let Some(bucket) = weekly.last_mut() {
            bucket.date = day.date;
            bucket.weekly_volume_usd += day.daily_volume_usd;
        }
    }

    weekly
}
