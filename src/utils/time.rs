use chrono::{DateTime, Datelike};

use super::{ONE_DAY, ONE_WEEK};

/// Round a timestamp down to a multiple of `step` seconds.
#[inline]
pub fn align_down(timestamp: i64, step: i64) -> i64 {
    timestamp.div_euclid(step) * step
}

#[inline]
pub fn start_of_minute(timestamp: i64) -> i64 {
    align_down(timestamp, 60)
}

/// ISO-8601 week number (1..=53) of the UTC day containing `timestamp`.
pub fn iso_week(timestamp: i64) -> u32 {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.iso_week().week())
        .unwrap_or_default()
}

/// Reference timestamps for historical comparisons, aligned to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTimestamps {
    pub one_day: i64,
    pub two_day: i64,
    pub one_week: i64,
    pub two_week: i64,
}

impl ChangeTimestamps {
    pub fn at(now: i64) -> Self {
        let now = start_of_minute(now);
        Self {
            one_day: now - ONE_DAY,
            two_day: now - 2 * ONE_DAY,
            one_week: now - ONE_WEEK,
            two_week: now - 2 * ONE_WEEK,
        }
    }
}
