//! Conversion helpers for subgraph payloads.
//!
//! The subgraph encodes `BigDecimal` and `BigInt` fields as JSON strings.
//! These helpers parse them with `BigDecimal` for precision before narrowing
//! to `f64`/`u64`, and accept plain JSON numbers as well so cached values
//! serialized back to JSON decode the same way.

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde::{de::Error, Deserialize, Deserializer};
use std::str::FromStr;

// ============================================
// String to number conversions
// ============================================

/// Parse a decimal string to f64 using BigDecimal.
///
/// Returns `None` for unparsable or non-finite values.
pub fn parse_decimal(value_str: &str) -> Option<f64> {
    let big_value = BigDecimal::from_str(value_str.trim()).ok()?;

    let result = big_value.to_f64()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

/// Lowercase an address so cache keys are stable regardless of checksum casing.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

// ============================================
// Serde helpers
// ============================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
}

/// Deserialize a `BigDecimal` string (or number) into f64. `null` becomes 0.
pub fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Str(s) => {
            parse_decimal(&s).ok_or_else(|| D::Error::custom(format!("invalid decimal: {s}")))
        },
        RawNumber::Int(n) => Ok(n as f64),
        RawNumber::Float(n) => Ok(n),
        RawNumber::Null => Ok(0.0),
    }
}

/// Deserialize a `BigInt` string (or number) into u64. `null` becomes 0.
pub fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Str(s) => BigDecimal::from_str(s.trim())
            .ok()
            .and_then(|v| v.to_u64())
            .ok_or_else(|| D::Error::custom(format!("invalid integer: {s}"))),
        RawNumber::Int(n) => u64::try_from(n).map_err(D::Error::custom),
        RawNumber::Float(n) if n >= 0.0 && n.is_finite() => Ok(n as u64),
        RawNumber::Float(n) => Err(D::Error::custom(format!("invalid integer: {n}"))),
        RawNumber::Null => Ok(0),
    }
}

/// Deserialize a timestamp string (or number) into i64. `null` becomes 0.
pub fn de_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Str(s) => BigDecimal::from_str(s.trim())
            .ok()
            .and_then(|v| v.to_i64())
            .ok_or_else(|| D::Error::custom(format!("invalid integer: {s}"))),
        RawNumber::Int(n) => Ok(n),
        RawNumber::Float(n) if n.is_finite() => Ok(n as i64),
        RawNumber::Float(n) => Err(D::Error::custom(format!("invalid integer: {n}"))),
        RawNumber::Null => Ok(0),
    }
}

/// Deserialize an optional timestamp; missing or `null` becomes `None`.
pub fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None | Some(RawNumber::Null) => Ok(None),
        Some(RawNumber::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer: {s}"))),
        Some(RawNumber::Int(n)) => Ok(Some(n)),
        Some(RawNumber::Float(n)) => Ok(Some(n as i64)),
    }
}
