//! Statement date normalization.
//!
//! Bank statements carry value dates as `dd-Mon-yy` (`05-Jan-23`). The rate
//! dataset keys on calendar dates, so every value date is turned into a
//! [`NaiveDate`] before joining; its canonical text form is `yyyy-MM-dd`.
//!
//! # Century rule
//!
//! Two-digit years are resolved against [`CENTURY_PIVOT`]:
//!
//! | `yy`       | Year          |
//! |------------|---------------|
//! | `00`..`69` | `2000`..`2069` |
//! | `70`..`99` | `1970`..`1999` |

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Two-digit years below this are 20xx, the rest 19xx.
pub const CENTURY_PIVOT: u32 = 70;

static VALUE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<day>\d{1,2})-(?P<month>[A-Za-z]{3})-(?P<year>\d{2})$")
        .expect("value date pattern is valid")
});

fn month_from_abbrev(s: &str) -> Option<u32> {
    let month = match s.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Resolve a two-digit year to a full year using [`CENTURY_PIVOT`].
pub fn expand_two_digit_year(yy: u32) -> i32 {
    if yy < CENTURY_PIVOT {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Parse a `dd-Mon-yy` value date.
///
/// Returns `None` for anything that does not match the pattern or names an
/// impossible day (`31-Feb-23`).
pub fn normalize_value_date(raw: &str) -> Option<NaiveDate> {
    let caps = VALUE_DATE_RE.captures(raw.trim())?;
    let day: u32 = caps["day"].parse().ok()?;
    let month = month_from_abbrev(&caps["month"])?;
    let yy: u32 = caps["year"].parse().ok()?;

    NaiveDate::from_ymd_opt(expand_two_digit_year(yy), month, day)
}

/// Format a date back into the statement's `dd-Mon-yy` form.
pub fn format_value_date(date: NaiveDate) -> String {
    date.format("%d-%b-%y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_statement_date() {
        assert_eq!(normalize_value_date("05-Jan-23"), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(normalize_value_date("29-Jun-17"), NaiveDate::from_ymd_opt(2017, 6, 29));
    }

    #[test]
    fn test_tolerates_whitespace_case_and_single_digit_day() {
        assert_eq!(normalize_value_date("  5-jan-23 "), NaiveDate::from_ymd_opt(2023, 1, 5));
        assert_eq!(normalize_value_date("05-DEC-19"), NaiveDate::from_ymd_opt(2019, 12, 5));
    }

    #[test]
    fn test_century_pivot() {
        assert_eq!(normalize_value_date("01-Jan-00"), NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(normalize_value_date("31-Dec-69"), NaiveDate::from_ymd_opt(2069, 12, 31));
        assert_eq!(normalize_value_date("01-Jan-70"), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(normalize_value_date("31-Dec-99"), NaiveDate::from_ymd_opt(1999, 12, 31));
    }

    #[test]
    fn test_malformed_dates_are_absent() {
        assert_eq!(normalize_value_date(""), None);
        assert_eq!(normalize_value_date("2023-01-05"), None);
        assert_eq!(normalize_value_date("05/01/23"), None);
        assert_eq!(normalize_value_date("05-Foo-23"), None);
        assert_eq!(normalize_value_date("05-Jan-2023"), None);
        assert_eq!(normalize_value_date("31-Feb-23"), None);
        assert_eq!(normalize_value_date("00-Jan-23"), None);
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(normalize_value_date("29-Feb-24"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(normalize_value_date("29-Feb-23"), None);
    }

    #[test]
    fn test_round_trip_within_window() {
        for raw in ["05-Jan-23", "29-Feb-24", "31-Dec-99", "01-Jan-70", "15-Aug-00", "30-Nov-69"] {
            let date = normalize_value_date(raw).unwrap();
            assert_eq!(format_value_date(date), raw);
        }
    }

    #[test]
    fn test_canonical_form() {
        let date = normalize_value_date("05-Jan-23").unwrap();
        assert_eq!(date.format(crate::models::CANONICAL_DATE_FORMAT).to_string(), "2023-01-05");
    }
}
