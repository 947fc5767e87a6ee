//! Recency window over bulletin timestamps published as local wall-clock time.
//!
//! Upstream reports `occurrence_date` as a naive `YYYY/MM/DD HH:MM:SS` in
//! Japan time. The zone is attached explicitly, converted to UTC, and the age
//! compared against a trailing window.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::EngineError;

/// Zone the upstream feed publishes its timestamps in.
pub const SOURCE_ZONE: &str = "Asia/Tokyo";

/// Default trailing window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

pub fn default_window() -> Duration {
  Duration::minutes(DEFAULT_WINDOW_MINUTES)
}

const LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse an upstream occurrence timestamp. `/` date separators are accepted.
pub fn parse_occurrence(raw: &str) -> Result<NaiveDateTime, EngineError> {
  let normalized = raw.trim().replace('/', "-");
  if normalized.is_empty() {
    return Err(EngineError::timestamp(raw, "empty timestamp"));
  }
  LAYOUTS
    .iter()
    .find_map(|layout| NaiveDateTime::parse_from_str(&normalized, layout).ok())
    .ok_or_else(|| EngineError::timestamp(raw, "expected YYYY-MM-DD HH:MM[:SS]"))
}

/// A resolved source zone. `fell_back` is set when the requested name was
/// unknown and UTC was substituted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceZone {
  pub tz: Tz,
  pub fell_back: bool,
}

/// Look up an IANA zone name, degrading to UTC when it is unavailable.
pub fn resolve_zone(name: &str) -> SourceZone {
  match name.parse::<Tz>() {
    Ok(tz) => SourceZone { tz, fell_back: false },
    Err(_) => {
      warn!(zone = name, "time zone unavailable, using UTC");
      SourceZone {
        tz: Tz::UTC,
        fell_back: true,
      }
    }
  }
}

/// Interpret `local` as wall-clock time in `zone` and return the instant.
///
/// Ambiguous times (DST fold) take the earlier instant. Times that do not
/// exist in the zone are rejected.
pub fn localize(local: NaiveDateTime, zone: &SourceZone) -> Result<DateTime<Utc>, EngineError> {
  zone
    .tz
    .from_local_datetime(&local)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .ok_or_else(|| {
      EngineError::timestamp(
        &local.to_string(),
        format!("local time does not exist in {}", zone.tz.name()),
      )
    })
}

/// Outcome of a recency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
  /// `0 <= age < window`.
  Recent { age: Duration },
  /// `age >= window`.
  Stale { age: Duration },
  /// Timestamp lies after `now`: clock skew or a bad upstream value.
  Future { ahead: Duration },
}

impl Recency {
  pub fn is_recent(&self) -> bool {
    matches!(self, Self::Recent { .. })
  }
}

/// Classify an occurrence against `now` and a trailing `window`.
pub fn check(
  occurrence_local: NaiveDateTime,
  source_zone: &str,
  now_utc: DateTime<Utc>,
  window: Duration,
) -> Result<Recency, EngineError> {
  let zone = resolve_zone(source_zone);
  let occurred = localize(occurrence_local, &zone)?;
  let delta = now_utc - occurred;

  let recency = if delta < Duration::zero() {
    warn!(
      occurred = %occurred,
      now = %now_utc,
      "bulletin timestamp is in the future, treating as not recent"
    );
    Recency::Future { ahead: -delta }
  } else if delta < window {
    Recency::Recent { age: delta }
  } else {
    Recency::Stale { age: delta }
  };
  Ok(recency)
}

/// Parse + check in one step. Unparsable timestamps are never recent.
pub fn is_recent(raw: &str, source_zone: &str, now_utc: DateTime<Utc>, window: Duration) -> bool {
  parse_occurrence(raw)
    .and_then(|local| check(local, source_zone, now_utc, window))
    .map(|r| r.is_recent())
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;

  // 2025-01-15 19:30:00 JST == 10:30:00 UTC.
  const OCCURRED: &str = "2025/01/15 19:30:00";

  fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, h, m, s).unwrap()
  }

  fn recency_at(now: DateTime<Utc>) -> Recency {
    let local = parse_occurrence(OCCURRED).unwrap();
    check(local, SOURCE_ZONE, now, default_window()).unwrap()
  }

  #[test]
  fn parses_slash_separated_dates() {
    let t = parse_occurrence("2025/01/15 19:30:00").unwrap();
    assert_eq!(t.to_string(), "2025-01-15 19:30:00");
  }

  #[test]
  fn parses_alternate_layouts() {
    assert!(parse_occurrence("2025-01-15T19:30:00").is_ok());
    assert!(parse_occurrence("2025/01/15 19:30").is_ok());
    assert!(parse_occurrence("2025/01/15 19:30:00.250").is_ok());
  }

  #[test]
  fn rejects_garbage_timestamps() {
    for bad in ["", "   ", "yesterday", "2025/13/01 00:00:00", "19:30:00"] {
      assert!(parse_occurrence(bad).is_err(), "{:?} should be rejected", bad);
    }
  }

  #[test]
  fn just_inside_window_is_recent() {
    assert_eq!(
      recency_at(utc(10, 59, 59)),
      Recency::Recent {
        age: Duration::seconds(29 * 60 + 59)
      }
    );
  }

  #[test]
  fn window_boundary_is_exclusive() {
    assert_eq!(
      recency_at(utc(11, 0, 0)),
      Recency::Stale {
        age: Duration::minutes(30)
      }
    );
  }

  #[test]
  fn exact_occurrence_instant_is_recent() {
    assert!(recency_at(utc(10, 30, 0)).is_recent());
  }

  #[test]
  fn future_timestamp_is_not_recent() {
    let r = recency_at(utc(10, 25, 0));
    assert_eq!(
      r,
      Recency::Future {
        ahead: Duration::minutes(5)
      }
    );
    assert!(!r.is_recent());
  }

  #[test]
  fn unknown_zone_falls_back_to_utc() {
    let zone = resolve_zone("Mars/Olympus_Mons");
    assert!(zone.fell_back);
    assert_eq!(zone.tz, Tz::UTC);

    // Read as UTC, 19:30 is 9 hours after the JST reading.
    let local = parse_occurrence(OCCURRED).unwrap();
    let r = check(local, "Mars/Olympus_Mons", utc(19, 40, 0), default_window()).unwrap();
    assert_eq!(
      r,
      Recency::Recent {
        age: Duration::minutes(10)
      }
    );
  }

  #[test]
  fn known_zone_does_not_fall_back() {
    let zone = resolve_zone(SOURCE_ZONE);
    assert!(!zone.fell_back);
    assert_eq!(zone.tz, chrono_tz::Asia::Tokyo);
  }

  #[test]
  fn nonexistent_local_time_is_an_error() {
    // Clocks in New York jump from 02:00 to 03:00 on 2025-03-09.
    let local = parse_occurrence("2025/03/09 02:30:00").unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 9, 8, 0, 0).unwrap();
    assert!(check(local, "America/New_York", now, default_window()).is_err());
  }

  #[test]
  fn is_recent_swallows_parse_failures() {
    assert!(!is_recent("not a date", SOURCE_ZONE, utc(10, 40, 0), default_window()));
    assert!(is_recent(OCCURRED, SOURCE_ZONE, utc(10, 40, 0), default_window()));
  }
}
