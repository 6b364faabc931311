//! Date grammar for `date` fields.
//!
//! Accepted: `YYYY-M-D` or `YYYY/M/D` (one separator used throughout), then
//! optionally `T` or a space and `HH:MM[:SS[.fff]]`, then optionally `Z` or a
//! `+HH:MM` / `-HHMM` offset. Year always comes first, so nothing here is
//! ambiguous between month-first and day-first readings. Only the date portion
//! is kept; offsets are validated but do not shift the date.

use super::error::DateParseError;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(?P<year>[0-9]{4})(?P<sep1>[-/])(?P<month>[0-9]{1,2})(?P<sep2>[-/])(?P<day>[0-9]{1,2})(?:[T ](?P<hour>[0-9]{2}):(?P<minute>[0-9]{2})(?::(?P<second>[0-9]{2})(?:\.(?P<fraction>[0-9]{1,9}))?)?(?P<offset>[Zz]|[+-](?P<off_hour>[0-9]{2}):?(?P<off_minute>[0-9]{2}))?)?$",
    )
    .map_err(|e| tracing::error!("Failed to compile date regex: {}", e))
    .ok()
});

/// Parse a trimmed cell into a calendar date
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    // Without a pattern every date is rejected rather than misread
    let caps = DATE_PATTERN
        .as_ref()
        .and_then(|pattern| pattern.captures(input))
        .ok_or_else(|| DateParseError::Format(input.to_string()))?;

    if caps["sep1"] != caps["sep2"] {
        return Err(DateParseError::MixedSeparators(input.to_string()));
    }

    let number = |name: &str| -> u32 {
        caps.name(name)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let year = caps["year"]
        .parse::<i32>()
        .map_err(|_| DateParseError::Format(input.to_string()))?;
    let date = NaiveDate::from_ymd_opt(year, number("month"), number("day"))
        .ok_or_else(|| DateParseError::InvalidDate(input.to_string()))?;

    if caps.name("hour").is_some() {
        NaiveTime::from_hms_opt(number("hour"), number("minute"), number("second"))
            .ok_or_else(|| DateParseError::InvalidTime(input.to_string()))?;
    }

    if caps.name("off_hour").is_some() && (number("off_hour") > 23 || number("off_minute") > 59) {
        return Err(DateParseError::InvalidTime(input.to_string()));
    }

    Ok(date)
}

/// Canonical `YYYY-MM-DD` rendering of a parsed cell
pub fn canonical_date(input: &str) -> Result<String, DateParseError> {
    parse_date(input).map(|date| date.format("%Y-%m-%d").to_string())
}
