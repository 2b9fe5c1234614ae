//! Local wall-clock timestamps.
//!
//! Times are stored and returned without an offset (`2025-03-01T09:00:00`).
//! Input that carries an RFC 3339 offset (`2025-03-01T00:00:00.000Z`) is converted
//! to the server's local time zone first, so every timestamp compares on one clock.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an RFC 3339 or naive ISO timestamp into local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Like [`parse_timestamp`], but also accepts a bare date (local midnight).
pub fn parse_timestamp_or_date(raw: &str) -> Option<NaiveDateTime> {
    parse_timestamp(raw).or_else(|| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// `deserialize_with` helper for block times.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_of(rfc3339: &str) -> NaiveDateTime {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Local)
            .naive_local()
    }

    #[test]
    fn test_naive_input_is_kept_as_is() {
        assert_eq!(
            parse_timestamp("2025-03-01T09:30:00").unwrap().to_string(),
            "2025-03-01 09:30:00"
        );
        assert_eq!(
            parse_timestamp("2025-03-01T09:30").unwrap().to_string(),
            "2025-03-01 09:30:00"
        );
    }

    #[test]
    fn test_offset_input_is_moved_to_local_time() {
        assert_eq!(
            parse_timestamp("2025-03-01T00:00:00.000Z"),
            Some(local_of("2025-03-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_local_offset_round_trips_to_same_wall_clock() {
        let nine = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let stamped = Local.from_local_datetime(&nine).single().unwrap().to_rfc3339();
        assert_eq!(parse_timestamp(&stamped), Some(nine));
    }

    #[test]
    fn test_bare_date_is_midnight() {
        assert_eq!(
            parse_timestamp_or_date("2025-03-01").unwrap().to_string(),
            "2025-03-01 00:00:00"
        );
        assert!(parse_timestamp("2025-03-01").is_none());
        assert!(parse_timestamp_or_date("next tuesday").is_none());
    }
}
