//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Placeholder shown for posts without a publication date
pub const NO_DATE: &str = "No date";

/// Format a date in long form (like "January 5, 2024")
pub fn full_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y").to_string()
}

/// Long-form date, or [`NO_DATE`] when there is none
pub fn display_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(full_date).unwrap_or_else(|| NO_DATE.to_string())
}

/// Format a date in ISO 8601, for `<time datetime>` attributes
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Parse a date string in the formats used by CMS APIs and front-matter
///
/// Naive values are taken as UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(full_date(&date), "January 5, 2024");
    }

    #[test]
    fn test_display_date_fallback() {
        assert_eq!(display_date(None), "No date");
    }

    #[test]
    fn test_parse_storyblok_dates() {
        // Storyblok uses a space-separated UTC timestamp with milliseconds
        let dt = parse_date("2024-03-09 14:05:12.345").unwrap();
        assert_eq!(date_xml(&dt), "2024-03-09T14:05:12+00:00");

        let dt = parse_date("2024-03-09T14:05:12.000Z").unwrap();
        assert_eq!(full_date(&dt), "March 9, 2024");
    }

    #[test]
    fn test_parse_front_matter_dates() {
        assert!(parse_date("2024-01-15").is_some());
        assert!(parse_date("2024/01/15 10:30").is_some());
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }
}
