// Parsing and arithmetic helpers shared by the pipeline.
//
// This module centralizes the "dirty" date/number handling so the rest of
// the code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

// Date-only shapes accepted by `parse_calendar_date`. `%Y-%m-%d` is the
// canonical documented format; the rest cover common spreadsheet exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

// Date-time shapes. `%.f` also matches an absent fraction, so each entry
// covers both `12:30:05` and `12:30:05.123`.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse a cell into a calendar date, accepting any of the documented
/// shapes. Date-times (including RFC 3339 strings with an offset) are
/// truncated to their date component, so time-of-day noise in the input
/// can never shift a day count.
///
/// Returns `None` for anything that is not recognizably a date.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Lead time in whole days, inclusive of both endpoints: an item committed
/// and closed on the same day has a lead time of 1, not 0.
pub fn lead_time_days(committed: NaiveDate, closed: NaiveDate) -> i64 {
    (closed - committed).num_days() + 1
}

pub fn mean(values: &[i64]) -> f64 {
    // Arithmetic mean at full precision; 0 for an empty slice to avoid NaNs.
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().copied().sum();
    sum as f64 / values.len() as f64
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_canonical_and_alternate_dates() {
        assert_eq!(parse_calendar_date("2025-01-31"), Some(date(2025, 1, 31)));
        assert_eq!(parse_calendar_date(" 2025/01/31 "), Some(date(2025, 1, 31)));
        assert_eq!(parse_calendar_date("01/31/2025"), Some(date(2025, 1, 31)));
        assert_eq!(parse_calendar_date("31.01.2025"), Some(date(2025, 1, 31)));
    }

    #[test]
    fn truncates_datetimes_to_their_date() {
        assert_eq!(
            parse_calendar_date("2025-01-31T23:59:59"),
            Some(date(2025, 1, 31))
        );
        assert_eq!(
            parse_calendar_date("2025-01-31 08:15:00"),
            Some(date(2025, 1, 31))
        );
        assert_eq!(
            parse_calendar_date("2025-01-31T23:59:59+11:00"),
            Some(date(2025, 1, 31))
        );
        assert_eq!(
            parse_calendar_date("2025/01/31 08:15:00.250"),
            Some(date(2025, 1, 31))
        );
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("   "), None);
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date("2025-13-01"), None);
        assert_eq!(parse_calendar_date("2025-02-30"), None);
    }

    #[test]
    fn lead_time_is_inclusive_of_both_endpoints() {
        let d = date(2025, 1, 1);
        assert_eq!(lead_time_days(d, d), 1);
        assert_eq!(lead_time_days(d, date(2025, 1, 3)), 3);
        assert_eq!(lead_time_days(date(2024, 12, 31), date(2025, 1, 1)), 2);
    }

    #[test]
    fn mean_of_empty_slice_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1, 3]), 2.0);
        assert_eq!(mean(&[1, 2]), 1.5);
    }

    #[test]
    fn format_int_inserts_thousands_separators() {
        assert_eq!(format_int(9855i64), "9,855");
        assert_eq!(format_int(12usize), "12");
    }
}
