//! Date-time parsing for inference and sort keys.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::value::Value;

/// Canonical text form of date-time values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Shortest text considered for date parsing.
const MIN_DATE_LEN: usize = 3;

/// Parses text as a date or date-time.
///
/// Offsets in RFC 3339 input are dropped after parsing so the wall-clock
/// time of day is preserved. Returns `None` for anything shorter than three
/// characters or not matching a supported format.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.len() < MIN_DATE_LEN {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Returns `true` when the time of day is exactly midnight.
pub fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.time() == NaiveTime::MIN
}

/// Unix timestamp (seconds) of a value, for date/time sort keys.
///
/// Text that is only a time of day is measured from midnight, so time
/// columns order correctly among themselves.
pub fn timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::DateTime(dt) => Some(dt.and_utc().timestamp()),
        Value::Text(text) => parse_datetime(text)
            .map(|dt| dt.and_utc().timestamp())
            .or_else(|| parse_time(text)),
        _ => None,
    }
}

fn parse_time(text: &str) -> Option<i64> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .map(|time| (time - NaiveTime::MIN).num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_dates_at_midnight() {
        assert_eq!(parse_datetime("2024-02-29"), Some(at(2024, 2, 29, 0, 0, 0)));
        assert_eq!(parse_datetime("03/15/2023"), Some(at(2023, 3, 15, 0, 0, 0)));
        assert_eq!(parse_datetime("15 March 2023"), Some(at(2023, 3, 15, 0, 0, 0)));
        assert_eq!(parse_datetime("Mar 15, 2023"), Some(at(2023, 3, 15, 0, 0, 0)));
    }

    #[test]
    fn parses_datetimes() {
        assert_eq!(
            parse_datetime("2024-01-05 13:45:10"),
            Some(at(2024, 1, 5, 13, 45, 10))
        );
        assert_eq!(
            parse_datetime("2024-01-05T13:45"),
            Some(at(2024, 1, 5, 13, 45, 0))
        );
        assert_eq!(
            parse_datetime("2024-01-05T13:45:10+02:00"),
            Some(at(2024, 1, 5, 13, 45, 10))
        );
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("1"), None);
        assert_eq!(parse_datetime("123"), None);
        assert_eq!(parse_datetime("hello"), None);
        assert_eq!(parse_datetime("2024-13-45"), None);
        assert_eq!(parse_datetime("ORDER-2024-001"), None);
    }

    #[test]
    fn midnight_detection() {
        assert!(is_midnight(&at(2024, 1, 1, 0, 0, 0)));
        assert!(!is_midnight(&at(2024, 1, 1, 0, 0, 1)));
    }

    #[test]
    fn timestamps() {
        assert_eq!(timestamp(&Value::from("1970-01-02")), Some(86_400));
        assert_eq!(timestamp(&Value::from(at(1970, 1, 1, 0, 1, 0))), Some(60));
        assert_eq!(timestamp(&Value::from("01:00")), Some(3_600));
        assert_eq!(timestamp(&Value::from("soon")), None);
        assert_eq!(timestamp(&Value::from(5i64)), None);
    }
}
