//! Timestamps as stored in documents.
//!
//! Stored values are UTC strings in `%Y-%m-%d %H:%M:%S`, so lexicographic order
//! equals chronological order. The soft-delete marker is the empty string for
//! a live record.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker stored in `deleted_at` for live records
pub const LIVE: &str = "";

/// Current time at the stored precision (whole seconds)
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format(at: DateTime<Utc>) -> String {
    at.format(FORMAT).to_string()
}

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode a `deleted_at` value: empty means live
pub fn parse_deleted(value: &str) -> Result<Option<DateTime<Utc>>, String> {
    if value == LIVE {
        return Ok(None);
    }
    parse(value)
        .map(Some)
        .ok_or_else(|| format!("invalid deleted_at timestamp '{}'", value))
}

pub fn parse_required(field: &str, value: &str) -> Result<DateTime<Utc>, String> {
    parse(value).ok_or_else(|| format!("invalid {} timestamp '{}'", field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_and_parse() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let stored = format(at);
        assert_eq!(stored, "2024-03-09 14:05:07");
        assert_eq!(parse(&stored), Some(at));
    }

    #[test]
    fn test_lexicographic_order_is_chronological() {
        let earlier = format(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
        let later = format(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_empty_deleted_at_means_live() {
        assert_eq!(parse_deleted("").unwrap(), None);
        assert!(parse_deleted("2024-01-01 00:00:00").unwrap().is_some());
        assert!(parse_deleted("yesterday").is_err());
    }

    #[test]
    fn test_now_has_whole_seconds() {
        assert_eq!(now().nanosecond(), 0);
    }
}
