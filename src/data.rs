use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
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
    "%m/%d/%y %H:%M:%S",
    "%d/%m/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%d/%m/%y %H:%M",
];

// Slash and dash dates are month-first, falling back to day-first when the
// month is out of range.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%y",
    "%d-%m-%y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %y",
    "%d %B %y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

// `%Y` reads "24" as the year 24, so anything below four digits is treated
// as a miss and left to the `%y` layouts.
const MIN_FOUR_DIGIT_YEAR: i32 = 1000;

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt)
            && parsed.year() >= MIN_FOUR_DIGIT_YEAR
        {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt)
            && parsed.year() >= MIN_FOUR_DIGIT_YEAR
        {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses an order date written in any of the supported layouts. Date-only
/// values land at midnight.
///
/// Returns `Ok(None)` for blank input and an error for text that is not a
/// date.
pub fn parse_order_date(value: &str) -> Result<Option<NaiveDateTime>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = parse_naive_datetime(trimmed) {
        return Ok(Some(parsed));
    }
    let date = parse_naive_date(trimmed)?;
    Ok(date.and_hms_opt(0, 0, 0))
}

/// Returns `Ok(None)` for blank input and an error for non-numeric or
/// non-finite text.
pub fn parse_number(value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| anyhow!("Failed to parse '{trimmed}' as number"))?;
    if !parsed.is_finite() {
        return Err(anyhow!("'{trimmed}' is not a finite number"));
    }
    Ok(Some(parsed))
}

pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
