//! Compact duration strings such as `30m` or `1d`
//!
//! Expiry and TTL flags take a `<value><unit>` string. The value is a
//! base-10 unsigned integer (leading zeros allowed) and the unit is a single
//! case-sensitive character:
//!
//! | unit | meaning | seconds |
//! |------|---------|---------|
//! | `s`  | second  | 1 |
//! | `m`  | minute  | 60 |
//! | `h`  | hour    | 3600 |
//! | `d`  | day     | 86400 |
//! | `M`  | month   | 2592000 (always 30 days) |
//!
//! # Example
//!
//! ```rust
//! use stackctl_core::parse_duration;
//!
//! assert_eq!(parse_duration("30m").unwrap(), 1800);
//! assert_eq!(parse_duration("0030M").unwrap(), 77_760_000);
//! assert!(parse_duration("30x").is_err());
//! ```

use std::time::Duration;

use crate::error::{CoreError, Result};

const SECOND: u64 = 1;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
// Not calendar accurate.
const MONTH: u64 = 30 * DAY;

/// Parse a `<value><unit>` string into a number of seconds
///
/// Fails with [`CoreError::InvalidDuration`] when the input is shorter than
/// two characters, the magnitude is not an unsigned integer, the unit is not
/// one of `s`, `m`, `h`, `d`, `M`, or the result does not fit in a `u64`.
pub fn parse_duration(input: &str) -> Result<u64> {
    let mut chars = input.chars();
    let unit = match chars.next_back() {
        Some(unit) if !chars.as_str().is_empty() => unit,
        _ => {
            return Err(CoreError::InvalidDuration(format!(
                "invalid time: {:?}",
                input
            )));
        }
    };
    let value_str = chars.as_str();

    // u64::from_str accepts a leading '+', the duration grammar does not
    if !value_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidDuration(format!(
            "invalid time value: {:?}",
            value_str
        )));
    }
    let value: u64 = value_str.parse().map_err(|_| {
        CoreError::InvalidDuration(format!("invalid time value: {:?}", value_str))
    })?;

    let multiplier = unit_multiplier(unit).ok_or_else(|| {
        CoreError::InvalidDuration(format!("invalid time unit: {:?}", unit))
    })?;

    value.checked_mul(multiplier).ok_or_else(|| {
        CoreError::InvalidDuration(format!("time out of range: {:?}", input))
    })
}

fn unit_multiplier(unit: char) -> Option<u64> {
    match unit {
        's' => Some(SECOND),
        'm' => Some(MINUTE),
        'h' => Some(HOUR),
        'd' => Some(DAY),
        'M' => Some(MONTH),
        _ => None,
    }
}

/// Value parser for CLI flags that take a compact duration
///
/// ```rust,ignore
/// #[arg(long, default_value = "5s", value_parser = parse_duration_arg)]
/// pub wait_interval: Duration,
/// ```
pub fn parse_duration_arg(input: &str) -> std::result::Result<Duration, String> {
    parse_duration(input)
        .map(Duration::from_secs)
        .map_err(|e| e.to_string())
}
