//! Field normalizers for the raw auction export.
//!
//! Dollar amounts arrive as `$3,453.23` and timestamps as `Dec-10-01 10:00:00`.
//! Both are rewritten into forms a SQL bulk loader accepts directly.

use crate::error::{MeltError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;

static NON_DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.]").unwrap());

const MONTHS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

/// Strip everything but digits and the decimal point from a dollar string.
///
/// Absent and empty values are returned as-is so the caller decides whether
/// that is an error.
pub fn normalize_dollar(money: Option<&str>) -> Option<Cow<'_, str>> {
    match money {
        None => None,
        Some("") => Some(Cow::Borrowed("")),
        Some(m) => Some(NON_DECIMAL_REGEX.replace_all(m, "")),
    }
}

/// Normalize a dollar string and parse it as a float.
pub fn parse_dollar(money: &str) -> Result<f64> {
    let normalized = normalize_dollar(Some(money)).unwrap_or_default();
    normalized
        .parse::<f64>()
        .map_err(|_| MeltError::InvalidCurrency(money.to_string()))
}

/// Map a three-letter month abbreviation to its zero-padded number.
pub fn month_number(abbr: &str) -> Option<&'static str> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == abbr)
        .map(|(_, number)| *number)
}

/// A timestamp rewritten to `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub value: String,
    /// False when the month abbreviation was unknown and copied verbatim.
    pub month_recognized: bool,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Rewrite `Mon-DD-YY HH:MM:SS` as `20YY-MM-DD HH:MM:SS`.
pub fn normalize_timestamp(raw: &str) -> Result<Timestamp> {
    let invalid = || MeltError::InvalidTimestamp(raw.to_string());

    let mut parts = raw.trim().split(' ');
    let date = parts.next().ok_or_else(invalid)?;
    let time = parts.next().ok_or_else(invalid)?;

    let mut date_parts = date.split('-');
    let (Some(month), Some(day), Some(year)) =
        (date_parts.next(), date_parts.next(), date_parts.next())
    else {
        return Err(invalid());
    };

    let (month, month_recognized) = match month_number(month) {
        Some(number) => (number, true),
        None => (month, false),
    };

    Ok(Timestamp {
        value: format!("20{}-{}-{} {}", year, month, day, time),
        month_recognized,
    })
}
