//! Lenient date parsing
//!
//! Listing dates arrive as free text wrapped in labels and annotations, such
//! as `Posted on: 15 July 2025` or `15 Aug 2025 - 23:59 (Europe/Brussels)`.
//! Stored dates are written back in a fixed format, but older stores may
//! still hold the raw text, so both shapes are read through the same parser.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Format used for `posted_on` in the job store
const POSTED_ON_FORMAT: &str = "%Y-%m-%d";

/// Format used for `application_deadline` in the job store
const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Complete date-time shapes tried before token scanning
const EXACT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Errors produced by [`parse_fuzzy_datetime`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("empty date text")]
    Empty,

    #[error("no recognisable date in '{0}'")]
    NoDate(String),

    #[error("date out of range in '{0}'")]
    OutOfRange(String),
}

/// Date components collected while scanning tokens
#[derive(Debug, Default)]
struct DateParts {
    year: Option<i32>,
    month: Option<u32>,
    numbers: Vec<u32>,
    time: Option<NaiveTime>,
    date: Option<NaiveDate>,
}

/// Parses a human-readable date embedded in arbitrary text
///
/// Words that are not part of a date are skipped, and anything from the
/// first `(` onward is ignored. Accepted shapes include `15 July 2025`,
/// `July 15, 2025`, `1st Sept 2025`, `2025-07-15`, `15/07/2025` (day first)
/// and an optional `HH:MM[:SS]` time. A missing time means midnight, and a
/// month with a year but no day (`July 2025`) means the first of the month.
///
/// # Example
///
/// ```
/// use euraxess_harvest::record::parse_fuzzy_datetime;
///
/// let posted = parse_fuzzy_datetime("Posted on: 15 July 2025").unwrap();
/// assert_eq!(posted.to_string(), "2025-07-15 00:00:00");
/// ```
pub fn parse_fuzzy_datetime(text: &str) -> Result<NaiveDateTime, DateParseError> {
    let cleaned = text.split('(').next().unwrap_or("").trim();
    if cleaned.is_empty() {
        return Err(DateParseError::Empty);
    }

    for format in EXACT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Ok(parsed);
        }
    }

    let mut parts = DateParts::default();
    for raw in cleaned.split(|c: char| c.is_whitespace() || c == ',') {
        scan_token(raw, &mut parts);
    }

    let time = parts.time.unwrap_or(NaiveTime::MIN);

    if let Some(date) = parts.date {
        return Ok(date.and_time(time));
    }

    let year = parts
        .year
        .ok_or_else(|| DateParseError::NoDate(cleaned.to_string()))?;

    // Without a month name, numbers are read day first
    let (month, day) = match (parts.month, parts.numbers.as_slice()) {
        (Some(month), [day, ..]) => (month, *day),
        (Some(month), []) => (month, 1),
        (None, [day, month, ..]) => (*month, *day),
        _ => return Err(DateParseError::NoDate(cleaned.to_string())),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(time))
        .ok_or_else(|| DateParseError::OutOfRange(cleaned.to_string()))
}

fn scan_token(raw: &str, parts: &mut DateParts) {
    let token = raw.trim_matches(|c: char| matches!(c, '.' | ':' | ';' | '-' | '–'));
    if token.is_empty() {
        return;
    }

    if token.contains(':') {
        if let Some(time) = parse_time(token) {
            parts.time = Some(time);
        }
        return;
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        parts.date = Some(date);
        return;
    }

    if token.contains('/') {
        if let Ok(date) = NaiveDate::parse_from_str(token, "%d/%m/%Y") {
            parts.date = Some(date);
        }
        return;
    }

    let digits = strip_ordinal(token);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if digits.len() == 4 {
            if parts.year.is_none() {
                parts.year = digits.parse().ok();
            }
        } else if digits.len() <= 2 {
            if let Ok(value) = digits.parse::<u32>() {
                if (1..=31).contains(&value) {
                    parts.numbers.push(value);
                }
            }
        }
        return;
    }

    if parts.month.is_none() {
        parts.month = month_from_name(token);
    }
}

fn parse_time(token: &str) -> Option<NaiveTime> {
    let mut fields = token.split(':').map(|f| f.parse::<u32>());
    let hour = fields.next()?.ok()?;
    let minute = fields.next()?.ok()?;
    let second = match fields.next() {
        Some(value) => value.ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn strip_ordinal(token: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
                return stripped;
            }
        }
    }
    token
}

fn month_from_name(token: &str) -> Option<u32> {
    if token.len() < 3 || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let lower = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|name| name.starts_with(&lower))
        .map(|index| index as u32 + 1)
}

/// Parses an application deadline, returning `None` when unparseable
pub fn parse_deadline(text: &str) -> Option<NaiveDateTime> {
    parse_fuzzy_datetime(text).ok()
}

/// Formats a posting date for the job store
pub fn format_posted_on(posted_on: &NaiveDateTime) -> String {
    posted_on.format(POSTED_ON_FORMAT).to_string()
}

/// Formats an application deadline for the job store
pub fn format_deadline(deadline: &NaiveDateTime) -> String {
    deadline.format(DEADLINE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_posted_on_with_prefix() {
        assert_eq!(
            parse_fuzzy_datetime("Posted on: 15 July 2025").unwrap(),
            date(2025, 7, 15)
        );
        assert_eq!(
            parse_fuzzy_datetime("Posted on 3 Jan 2024").unwrap(),
            date(2024, 1, 3)
        );
    }

    #[test]
    fn test_deadline_with_time_and_zone() {
        let parsed = parse_fuzzy_datetime("15 Aug 2025 - 23:59 (Europe/Brussels)").unwrap();
        assert_eq!(parsed, date(2025, 8, 15).date().and_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn test_month_first_and_ordinals() {
        assert_eq!(
            parse_fuzzy_datetime("July 15, 2025").unwrap(),
            date(2025, 7, 15)
        );
        assert_eq!(
            parse_fuzzy_datetime("1st Sept 2025").unwrap(),
            date(2025, 9, 1)
        );
    }

    #[test]
    fn test_iso_and_numeric_forms() {
        assert_eq!(parse_fuzzy_datetime("2025-07-15").unwrap(), date(2025, 7, 15));
        assert_eq!(
            parse_fuzzy_datetime("2025-07-15 00:00:00").unwrap(),
            date(2025, 7, 15)
        );
        assert_eq!(
            parse_fuzzy_datetime("2025-07-15 18:30").unwrap(),
            date(2025, 7, 15).date().and_hms_opt(18, 30, 0).unwrap()
        );
        assert_eq!(parse_fuzzy_datetime("15/07/2025").unwrap(), date(2025, 7, 15));
        assert_eq!(parse_fuzzy_datetime("15 07 2025").unwrap(), date(2025, 7, 15));
    }

    #[test]
    fn test_month_and_year_default_to_first_day() {
        assert_eq!(parse_fuzzy_datetime("July 2025").unwrap(), date(2025, 7, 1));
        assert_eq!(
            parse_fuzzy_datetime("Deadline: Sept 2025 - 12:00").unwrap(),
            date(2025, 9, 1).date().and_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_text_without_date() {
        assert_eq!(parse_fuzzy_datetime("   "), Err(DateParseError::Empty));
        assert!(matches!(
            parse_fuzzy_datetime("Posted on: soon"),
            Err(DateParseError::NoDate(_))
        ));
        assert!(matches!(
            parse_fuzzy_datetime("31 February 2025"),
            Err(DateParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_store_formats_read_back() {
        let posted = date(2025, 7, 15);
        assert_eq!(format_posted_on(&posted), "2025-07-15");
        assert_eq!(parse_fuzzy_datetime(&format_posted_on(&posted)).unwrap(), posted);

        let deadline = posted.date().and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(format_deadline(&deadline), "2025-07-15 23:59");
        assert_eq!(parse_deadline(&format_deadline(&deadline)), Some(deadline));
        assert_eq!(parse_deadline("no deadline"), None);
    }
}
