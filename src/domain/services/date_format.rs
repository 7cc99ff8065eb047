use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

// Numeric day/month forms are read month-first; the day-first entries only
// match once the first field cannot be a month.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Renders a date-like string as `DD/MM/YYYY`.
///
/// Null or blank input gives `""`. Anything that does not parse is returned
/// unchanged. Only the calendar date written in the string is kept; offsets are
/// not converted.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if raw.trim().is_empty() {
        return String::new();
    }

    match parse_calendar_date(raw.trim()) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// JSON flavour of [`format_date`]: non-string scalars pass through untouched.
pub fn format_date_value(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(Value::String(s)) => Value::String(format_date(Some(s))),
        Some(other) => other.clone(),
    }
}

fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.date_naive());
    }

    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_blank_give_empty() {
        assert_eq!(format_date(None), "");
        assert_eq!(format_date(Some("")), "");
        assert_eq!(format_date(Some("   ")), "");
    }

    #[test]
    fn test_common_api_shapes() {
        assert_eq!(format_date(Some("2024-01-15T10:30:00Z")), "15/01/2024");
        assert_eq!(format_date(Some("2024-01-15T23:30:00+02:00")), "15/01/2024");
        assert_eq!(format_date(Some("2023-11-05 08:12:45")), "05/11/2023");
        assert_eq!(format_date(Some("2023-11-05 08:12:45.123")), "05/11/2023");
        assert_eq!(format_date(Some("2023-11-05")), "05/11/2023");
        assert_eq!(format_date(Some("2023/11/05")), "05/11/2023");
    }

    #[test]
    fn test_offsets_and_mail_dates() {
        assert_eq!(format_date(Some("2024-01-15 10:30:00+01")), "15/01/2024");
        assert_eq!(format_date(Some("2024-01-15T10:30:00-0500")), "15/01/2024");
        assert_eq!(format_date(Some("Mon, 15 Jan 2024 10:30:00 GMT")), "15/01/2024");
    }

    #[test]
    fn test_numeric_day_month_is_month_first() {
        assert_eq!(format_date(Some("05/11/2023")), "11/05/2023");
        assert_eq!(format_date(Some("1/2/2024")), "02/01/2024");
        assert_eq!(format_date(Some("05.11.2023")), "11/05/2023");
        assert_eq!(format_date(Some("05/11/2023 08:00:00")), "11/05/2023");
    }

    #[test]
    fn test_day_first_when_month_is_impossible() {
        assert_eq!(format_date(Some("25/12/2023")), "25/12/2023");
        assert_eq!(format_date(Some("12/25/2023")), "25/12/2023");
        assert_eq!(format_date(Some("31-01-2024")), "31/01/2024");
    }

    #[test]
    fn test_unparseable_is_identity() {
        for raw in ["not a date", "0000-00-00 00:00:00", "2024-13-45", "demain"] {
            assert_eq!(format_date(Some(raw)), raw);
        }
    }

    #[test]
    fn test_value_variant() {
        assert_eq!(format_date_value(None), json!(""));
        assert_eq!(format_date_value(Some(&Value::Null)), json!(""));
        assert_eq!(format_date_value(Some(&json!("2024-02-29"))), json!("29/02/2024"));
        assert_eq!(format_date_value(Some(&json!(20240229))), json!(20240229));
    }
}
