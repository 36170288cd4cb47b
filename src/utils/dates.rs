use chrono::{Local, NaiveDate};

use crate::error::AttendanceError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, AttendanceError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| AttendanceError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve an optional `--date` argument, defaulting to today.
pub fn date_or_today(arg: Option<&str>) -> Result<NaiveDate, AttendanceError> {
    match arg {
        Some(s) => parse_date(s),
        None => Ok(today()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date("2026-08-01"),
            Ok(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap())
        );
        assert_eq!(
            parse_date(" 2026-08-01 "),
            Ok(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "yesterday", "2026-02-30", "01/08/2026"] {
            assert_eq!(
                parse_date(bad),
                Err(AttendanceError::InvalidDate(bad.to_string())),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn missing_date_arg_is_today() {
        assert_eq!(date_or_today(None), Ok(today()));
    }
}
