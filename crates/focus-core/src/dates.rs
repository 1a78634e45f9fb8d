//! Date conversions between the API, the display format and form inputs.
//!
//! - API: ISO 8601 (`2024-05-01`, `2024-05-01T14:30:00`, RFC 3339 with offset)
//! - Display: European `dd-MM-yyyy` and `dd-MM-yyyy HH:mm`
//! - Form inputs: `yyyy-MM-dd` and `yyyy-MM-ddTHH:mm`
//!
//! Display helpers return an empty string for missing or unparseable input so
//! they can be dropped straight into a label. Parsers return `None`.
//! Impossible calendar dates (`31-02-2024`) are rejected rather than rolled
//! over into the next month.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// European date display format.
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// European date-time display format.
pub const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M";
/// HTML date input format.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
/// HTML datetime-local input format.
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

static EUROPEAN_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("static regex"));
static EUROPEAN_DATETIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}-\d{2}-\d{4})\s+(\d{2}:\d{2})$").expect("static regex"));
static DATE_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));
static DATETIME_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$").expect("static regex"));

/// Parse a timestamp as sent by the API into local wall-clock time.
///
/// Offsets (`Z`, `+02:00`) are converted to the local zone; naive values are
/// taken as already local.
#[must_use]
pub fn parse_api_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATETIME_INPUT_FORMAT) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, DATE_INPUT_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// `2024-05-01T14:30:00` → `01-05-2024`.
#[must_use]
pub fn format_date_european(value: Option<&str>) -> String {
    value
        .and_then(parse_api_timestamp)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `2024-05-01T14:30:00` → `01-05-2024 14:30`.
#[must_use]
pub fn format_datetime_european(value: Option<&str>) -> String {
    value
        .and_then(parse_api_timestamp)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse `dd-MM-yyyy` or `dd-MM-yyyy HH:mm`. Date-only values are at midnight.
#[must_use]
pub fn parse_european_date(value: &str) -> Option<NaiveDateTime> {
    if let Some(caps) = EUROPEAN_DATETIME.captures(value) {
        let date = NaiveDate::parse_from_str(&caps[1], DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(&caps[2], "%H:%M").ok()?;
        return Some(date.and_time(time));
    }
    if EUROPEAN_DATE.is_match(value) {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN));
    }
    None
}

/// `01-05-2024` → `2024-05-01` for API payloads. Empty on invalid input.
#[must_use]
pub fn european_to_iso_date(value: &str) -> String {
    parse_european_date(value)
        .map(|dt| dt.format(DATE_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// Whether `value` looks like `dd-MM-yyyy` with an optional ` HH:mm`.
#[must_use]
pub fn is_european_date_format(value: &str) -> bool {
    EUROPEAN_DATE.is_match(value) || EUROPEAN_DATETIME.is_match(value)
}

/// API timestamp → `yyyy-MM-dd` for a date input.
#[must_use]
pub fn format_for_date_input(value: Option<&str>) -> String {
    value
        .and_then(parse_api_timestamp)
        .map(|dt| dt.format(DATE_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// API timestamp → `yyyy-MM-ddTHH:mm` for a datetime-local input.
#[must_use]
pub fn format_for_datetime_input(value: Option<&str>) -> String {
    value
        .and_then(parse_api_timestamp)
        .map(|dt| dt.format(DATETIME_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a date input value (`yyyy-MM-dd`).
#[must_use]
pub fn parse_from_date_input(value: &str) -> Option<NaiveDate> {
    if !DATE_INPUT.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_INPUT_FORMAT).ok()
}

/// Parse a datetime-local input value (`yyyy-MM-ddTHH:mm`).
#[must_use]
pub fn parse_from_datetime_input(value: &str) -> Option<NaiveDateTime> {
    if !DATETIME_INPUT.is_match(value) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, DATETIME_INPUT_FORMAT).ok()
}

/// Today's date in the display format.
#[must_use]
pub fn today_european() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Current local date and time in the display format.
#[must_use]
pub fn now_european() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_naive_timestamp() {
        assert_eq!(format_date_european(Some("2024-05-01T14:30:00")), "01-05-2024");
        assert_eq!(
            format_datetime_european(Some("2024-05-01T14:30:00.123")),
            "01-05-2024 14:30"
        );
    }

    #[test]
    fn formats_date_only() {
        assert_eq!(format_date_european(Some("2024-12-24")), "24-12-2024");
        assert_eq!(format_for_datetime_input(Some("2024-12-24")), "2024-12-24T00:00");
    }

    #[test]
    fn missing_or_garbage_formats_empty() {
        assert_eq!(format_date_european(None), "");
        assert_eq!(format_date_european(Some("")), "");
        assert_eq!(format_datetime_european(Some("yesterday")), "");
    }

    #[test]
    fn rfc3339_is_accepted() {
        // Exact output depends on the local zone; only check it parses.
        assert!(parse_api_timestamp("2024-05-01T14:30:00Z").is_some());
        assert!(!format_for_date_input(Some("2024-05-01T14:30:00+02:00")).is_empty());
    }

    #[test]
    fn parses_european_date_and_datetime() {
        let d = parse_european_date("05-03-2024").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2024-03-05 00:00");

        let dt = parse_european_date("05-03-2024 09:15").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-03-05 09:15");
    }

    #[test]
    fn european_parser_is_strict() {
        assert!(parse_european_date("5-3-2024").is_none());
        assert!(parse_european_date("2024-03-05").is_none());
        assert!(parse_european_date("31-02-2024").is_none());
        assert!(parse_european_date("").is_none());
    }

    #[test]
    fn european_to_iso() {
        assert_eq!(european_to_iso_date("24-12-2024"), "2024-12-24");
        assert_eq!(european_to_iso_date("24-12-2024 18:00"), "2024-12-24");
        assert_eq!(european_to_iso_date("nope"), "");
    }

    #[test]
    fn european_format_detection() {
        assert!(is_european_date_format("01-01-2025"));
        assert!(is_european_date_format("01-01-2025 08:00"));
        assert!(!is_european_date_format("2025-01-01"));
        assert!(!is_european_date_format("01-01-25"));
    }

    #[test]
    fn html_inputs() {
        assert_eq!(
            parse_from_date_input("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_from_date_input("2023-02-29").is_none());
        assert!(parse_from_date_input("29-02-2024").is_none());

        let dt = parse_from_datetime_input("2024-02-29T07:05").unwrap();
        assert_eq!(dt.format(DATETIME_FORMAT).to_string(), "29-02-2024 07:05");
        assert!(parse_from_datetime_input("2024-02-29 07:05").is_none());
    }

    #[test]
    fn today_has_display_shape() {
        assert!(is_european_date_format(&today_european()));
    }

    #[test]
    fn now_has_display_shape() {
        let now = now_european();
        assert!(EUROPEAN_DATETIME.is_match(&now), "{now}");
        assert!(parse_european_date(&now).is_some());
    }
}
