//! Calendar helpers: month boundaries, month ranges and lenient date parsing.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{HrError, Result};

/// Day zero of the 1900 date system used by spreadsheet serial numbers.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Text layouts accepted for date cells, tried in order.
///
/// Month-first comes before day-first, so `03/04/2023` reads as March 4th and
/// only unambiguous day-first text such as `15/03/2023` falls through.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
];

/// Text layouts that carry a time-of-day; the time is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

// ── Month boundaries ──────────────────────────────────────────────────────────

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// `true` when `date` lies in the same calendar month as `month_end`.
pub fn in_month(date: NaiveDate, month_end: NaiveDate) -> bool {
    date.year() == month_end.year() && date.month() == month_end.month()
}

/// Parse a `YYYY-MM` month into its first day.
///
/// ```
/// use hr_core::time_utils::parse_month;
///
/// let m = parse_month("2022-01").unwrap();
/// assert_eq!(m.to_string(), "2022-01-01");
/// assert!(parse_month("2022-13").is_err());
/// ```
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| HrError::InvalidMonth(s.to_string()))
}

/// Every month-end from the month of `start` through the month of `today`,
/// both inclusive, in ascending order.
///
/// Returns an empty vector when `start` lies after `today`.
pub fn month_ends(start: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let last = month_end(today);
    let mut current = month_end(start);
    let mut out = Vec::new();
    while current <= last {
        out.push(current);
        match current.succ_opt() {
            Some(next) => current = month_end(next),
            None => break,
        }
    }
    out
}

/// `"%b %Y"` label, e.g. `"Mar 2023"`.
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

// ── Lenient parsing ───────────────────────────────────────────────────────────

/// Convert a spreadsheet serial day number into a date.
///
/// The fractional (time-of-day) part is dropped. Non-finite and out-of-range
/// values yield `None`.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Spreadsheet serial day number of `date` (inverse of [`excel_serial_to_date`]).
pub fn date_to_excel_serial(date: NaiveDate) -> f64 {
    let (y, m, d) = EXCEL_EPOCH;
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(epoch) => (date - epoch).num_days() as f64,
        None => 0.0,
    }
}

/// Parse a date from free text, returning `None` for anything unrecognised.
///
/// Leading and trailing whitespace is ignored; a trailing `Z` is accepted on
/// ISO date-times.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
