//! Utility functions for the Vantage data layer.
//!
//! - [`conversion`] - Decimal-string parsing and serde helpers for subgraph numbers
//! - [`change`] - Percent-change arithmetic shared by every assembler
//! - [`time`] - Bucket alignment, change timestamps and ISO week numbers

mod change;
mod conversion;
mod time;

// ============================================
// Common Constants
// ============================================

/// Seconds in one hour bucket.
pub const ONE_HOUR: i64 = 3_600;

/// Seconds in one daily bucket.
pub const ONE_DAY: i64 = 86_400;

/// Seconds in one week.
pub const ONE_WEEK: i64 = 7 * ONE_DAY;

// ============================================
// Re-exports
// ============================================

pub use change::{percent_change, two_period_change};

pub use conversion::{de_f64, de_i64, de_opt_i64, de_u64, normalize_address, parse_decimal};

pub use time::{align_down, iso_week, start_of_minute, ChangeTimestamps};
