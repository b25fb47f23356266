//! Percent-change arithmetic.
//!
//! One convention everywhere: a change is only computable against a strictly
//! positive, finite baseline. Zero, negative or missing baselines yield `None`,
//! which callers surface as "unavailable" rather than 0% or 100%.

/// Two-point percent change: `(current - previous) / previous * 100`.
#[inline]
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if !current.is_finite() || !previous.is_finite() || previous <= 0.0 {
        return None;
    }

    let change = (current - previous) / previous * 100.0;

    change.is_finite().then_some(change)
}

/// Three-point change over two consecutive periods.
///
/// Given cumulative values now, one period ago and two periods ago, returns the
/// delta for the latest period and its percent change against the delta of the
/// period before it.
#[inline]
pub fn two_period_change(now: f64, one_ago: f64, two_ago: f64) -> (f64, Option<f64>) {
    let current_change = now - one_ago;
    let previous_change = one_ago - two_ago;

    (current_change, percent_change(current_change, previous_change))
}
