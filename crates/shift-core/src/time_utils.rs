//! Calendar-date resolution for uploaded shift exports.
//!
//! A file's date comes from the first row's `Start date` (spreadsheet serial,
//! a `D/M/YYYY H:MM:SS AM|PM` string or an ISO 8601 timestamp), falling back
//! to a leading `DD.MM.YYYY` in the file name.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

use crate::models::{StartDate, UNKNOWN_DATE};

const SECONDS_PER_DAY: i64 = 86_400;
/// Serial of 9999-12-31, the last date spreadsheets can represent.
const MAX_SERIAL: f64 = 2_958_465.0;

// ── Spreadsheet serials ───────────────────────────────────────────────────────

/// Convert a 1900-system spreadsheet serial into a timestamp.
///
/// Day 0 is 1899-12-30; serials before 60 are shifted by one day to account
/// for the fictitious 1900-02-29. The fractional part is rounded to the
/// nearest second first, so `0.99999999` rolls over into the next day.
/// Returns `None` for negative or non-finite input.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }

    let total_seconds = (serial * SECONDS_PER_DAY as f64).round() as i64;
    let mut days = total_seconds.div_euclid(SECONDS_PER_DAY);
    let secs = total_seconds.rem_euclid(SECONDS_PER_DAY);
    if days < 60 {
        days += 1;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)?;
    Some(date.and_time(time))
}

// ── Text timestamps ───────────────────────────────────────────────────────────

fn meridiem_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{2}):(\d{2})\s*(AM|PM)$")
            .expect("regex is valid")
    })
}

fn file_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})").expect("regex is valid"))
}

/// Parse a day-first, 12-hour timestamp such as `"5/3/2025 11:45:00 PM"`.
///
/// `12 AM` is midnight and `12 PM` is noon. Returns `None` when the text
/// does not match or names an impossible date or time.
pub fn parse_meridiem_timestamp(text: &str) -> Option<NaiveDateTime> {
    let caps = meridiem_pattern().captures(text.trim())?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let (day, month, year) = (num(1)?, num(2)?, num(3)?);
    let (hour12, minute, second) = (num(4)?, num(5)?, num(6)?);
    if !(1..=12).contains(&hour12) {
        return None;
    }

    let is_pm = caps.get(7)?.as_str().eq_ignore_ascii_case("PM");
    let hour = hour12 % 12 + if is_pm { 12 } else { 0 };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(date.and_time(time))
}

/// Parse an ISO 8601 timestamp or date, as ODS workbooks store date cells.
pub fn parse_iso_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Extract a leading `DD.MM.YYYY` from the base name of `file_name`.
pub fn date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    let caps = file_name_pattern().captures(base)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Format a calendar date the way day summaries are keyed: `YYYY-MM-DD`.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date of the day recorded in a `Start date` cell, if it can be read.
pub fn date_from_start(start: &StartDate) -> Option<NaiveDate> {
    match start {
        StartDate::Serial(serial) => serial_to_datetime(*serial).map(|dt| dt.date()),
        StartDate::Text(text) => parse_meridiem_timestamp(text)
            .or_else(|| parse_iso_timestamp(text))
            .map(|dt| dt.date()),
    }
}

/// Resolve the date label of one uploaded file.
///
/// `first_start` is the `Start date` of the file's first row only. Falls
/// back to the file name, then to [`UNKNOWN_DATE`].
pub fn resolve_day_date(first_start: Option<&StartDate>, file_name: &str) -> String {
    if let Some(date) = first_start.and_then(date_from_start) {
        debug!("{}: date {} taken from Start date", file_name, date);
        return format_day(date);
    }
    if let Some(date) = date_from_file_name(file_name) {
        debug!("{}: date {} taken from file name", file_name, date);
        return format_day(date);
    }
    debug!("{}: no date could be resolved", file_name);
    UNKNOWN_DATE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── serial_to_datetime ────────────────────────────────────────────────────

    #[test]
    fn test_serial_with_time_of_day() {
        // 2025-01-27 08:15:00
        let dt = serial_to_datetime(45684.34375).unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 27));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_serial_whole_days() {
        assert_eq!(serial_to_datetime(45658.0).unwrap().date(), ymd(2025, 1, 1));
        assert_eq!(serial_to_datetime(61.0).unwrap().date(), ymd(1900, 3, 1));
        assert_eq!(serial_to_datetime(1.0).unwrap().date(), ymd(1900, 1, 1));
    }

    #[test]
    fn test_serial_rounds_to_nearest_second() {
        let dt = serial_to_datetime(45684.999_999_99).unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 28));
    }

    #[test]
    fn test_serial_rejects_invalid() {
        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(1e300).is_none());
    }

    // ── parse_meridiem_timestamp ──────────────────────────────────────────────

    #[test]
    fn test_meridiem_pm() {
        let dt = parse_meridiem_timestamp("5/3/2025 11:45:00 PM").unwrap();
        assert_eq!(dt.date(), ymd(2025, 3, 5));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(23, 45, 0).unwrap());
    }

    #[test]
    fn test_meridiem_noon_and_midnight() {
        let noon = parse_meridiem_timestamp("1/2/2025 12:00:00 PM").unwrap();
        assert_eq!(noon.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let midnight = parse_meridiem_timestamp("1/2/2025 12:30:00 am").unwrap();
        assert_eq!(midnight.time(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
    }

    #[test]
    fn test_meridiem_two_digit_fields_and_whitespace() {
        let dt = parse_meridiem_timestamp("  27/01/2025 08:15:00 AM ").unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 27));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_meridiem_rejects_bad_input() {
        assert!(parse_meridiem_timestamp("2025-01-27 08:15:00").is_none());
        assert!(parse_meridiem_timestamp("31/2/2025 08:15:00 AM").is_none());
        assert!(parse_meridiem_timestamp("1/2/2025 13:15:00 PM").is_none());
        assert!(parse_meridiem_timestamp("1/2/2025 0:15:00 AM").is_none());
        assert!(parse_meridiem_timestamp("").is_none());
    }

    // ── parse_iso_timestamp ───────────────────────────────────────────────────

    #[test]
    fn test_iso_timestamp() {
        let dt = parse_iso_timestamp("2025-01-27T08:15:00").unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 27));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());

        let dt = parse_iso_timestamp("2025-01-27 23:59:59.5").unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 27));
        assert_eq!(parse_iso_timestamp("2025-01-27").unwrap().date(), ymd(2025, 1, 27));
    }

    #[test]
    fn test_iso_timestamp_rejects_other_layouts() {
        assert!(parse_iso_timestamp("27/01/2025").is_none());
        assert!(parse_iso_timestamp("2025-02-30T08:00:00").is_none());
        assert!(parse_iso_timestamp("").is_none());
    }

    // ── date_from_file_name ───────────────────────────────────────────────────

    #[test]
    fn test_file_name_date() {
        assert_eq!(
            date_from_file_name("13.12.2024_shift.xlsx"),
            Some(ymd(2024, 12, 13))
        );
        assert_eq!(
            date_from_file_name("/data/exports/01.02.2025.xlsx"),
            Some(ymd(2025, 2, 1))
        );
    }

    #[test]
    fn test_file_name_date_must_lead() {
        assert!(date_from_file_name("shift_13.12.2024.xlsx").is_none());
        assert!(date_from_file_name("1.12.2024.xlsx").is_none());
        assert!(date_from_file_name("32.13.2024.xlsx").is_none());
    }

    // ── resolve_day_date ──────────────────────────────────────────────────────

    #[test]
    fn test_resolve_prefers_serial_over_file_name() {
        let start = StartDate::Serial(45684.34375);
        assert_eq!(
            resolve_day_date(Some(&start), "13.12.2024_shift.xlsx"),
            "2025-01-27"
        );
    }

    #[test]
    fn test_resolve_text_start_date() {
        let start = StartDate::Text("5/3/2025 11:45:00 PM".to_string());
        assert_eq!(resolve_day_date(Some(&start), "export.xlsx"), "2025-03-05");
    }

    #[test]
    fn test_resolve_iso_start_date() {
        let start = StartDate::Text("2025-01-27T08:15:00".to_string());
        assert_eq!(resolve_day_date(Some(&start), "export.ods"), "2025-01-27");
    }

    #[test]
    fn test_resolve_unparseable_start_falls_back_to_file_name() {
        let start = StartDate::Text("yesterday".to_string());
        assert_eq!(
            resolve_day_date(Some(&start), "13.12.2024_shift.xlsx"),
            "2024-12-13"
        );
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(resolve_day_date(None, "export.xlsx"), UNKNOWN_DATE);
    }
}
