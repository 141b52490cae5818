//! Typed coercion of raw field text: integers, lock timers, timestamps.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::EngineError;

/// Legacy year-less layouts ("Wed Sep 17 10:00:43", optionally fractional).
/// Tried in order after the ISO form; the missing year is injected from the
/// caller's assumed year. Chrono rejects a weekday that disagrees with the
/// assumed year's calendar, which surfaces as a bad timestamp.
const LEGACY_LAYOUTS: &[&str] = &["%a %b %d %H:%M:%S%.f"];

/// ISO-8601 with numeric offset, as written by 2.6-era logs.
const ISO_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Permissive integer coercion: unparsable text becomes 0, never an error.
pub fn int_or_zero(raw: &str) -> i64 {
  raw.parse().unwrap_or(0)
}

/// Lock timers are logged in microseconds; records carry milliseconds.
pub fn lock_millis(raw: &str) -> f64 {
  raw.parse::<f64>().unwrap_or(0.0) / 1000.0
}

/// Parse a log timestamp in any of the supported layouts.
pub fn parse_timestamp(raw: &str, assumed_year: i32) -> Result<DateTime<Utc>, EngineError> {
  if let Ok(dt) = DateTime::parse_from_str(raw, ISO_LAYOUT) {
    return Ok(dt.with_timezone(&Utc));
  }

  for layout in LEGACY_LAYOUTS {
    let mut parsed = Parsed::new();
    if parse(&mut parsed, raw, StrftimeItems::new(layout)).is_err() {
      continue;
    }
    if parsed.set_year(i64::from(assumed_year)).is_err() {
      continue;
    }
    let (Ok(date), Ok(time)) = (parsed.to_naive_date(), parsed.to_naive_time()) else {
      continue;
    };
    return Ok(NaiveDateTime::new(date, time).and_utc());
  }

  Err(EngineError::Timestamp(raw.to_string()))
}
