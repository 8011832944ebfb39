//! Parsing and validation for `--when` and the date filters.

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeZone;

use crate::Result;
use crate::ThingsError;

const DATE_OR_TIME_FORMATS: &str = "YYYY-MM-DD, YYYY-MM-DD@HH:MM, or RFC3339";

/// Keywords Things understands for `when` without further parsing.
pub const WHEN_KEYWORDS: [&str; 6] = [
    "today", "tomorrow", "evening", "someday", "anytime", "inbox",
];

/// A parsed date, optionally with a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub at: DateTime<Local>,
    pub has_time: bool,
}

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        self.at.date_naive()
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD@HH:MM`, `YYYY-MM-DD HH:MM` or RFC3339.
pub fn parse_date_or_time(value: &str) -> Result<ParsedDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(ParsedDate {
            at: local_midnight(date),
            has_time: false,
        });
    }
    for format in ["%Y-%m-%d@%H:%M", "%Y-%m-%d %H:%M"] {
        let at = NaiveDateTime::parse_from_str(value, format)
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest());
        if let Some(at) = at {
            return Ok(ParsedDate { at, has_time: true });
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(ParsedDate {
            at: parsed.with_timezone(&Local),
            has_time: true,
        });
    }
    Err(ThingsError::InvalidDate {
        value: value.to_string(),
        expected: DATE_OR_TIME_FORMATS,
    })
}

/// Parse a plain `YYYY-MM-DD` date.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ThingsError::InvalidDate {
        value: value.trim().to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Midnight of `date` in the local zone, falling back to UTC midnight on the
/// rare days where local midnight does not exist.
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Check a `--when` value before it is sent to Things.
pub fn validate_when(value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() || is_when_keyword(value) {
        return Ok(());
    }
    match parse_date_or_time(value) {
        Ok(_) => Ok(()),
        Err(err) => Err(ThingsError::InvalidWhen {
            value: value.to_string(),
            reason: err.to_string(),
        }),
    }
}

pub fn is_when_keyword(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    WHEN_KEYWORDS.contains(&lower.as_str())
}

/// `--later` is shorthand for `--when=evening` when no explicit value is set.
pub fn resolve_when(value: &str, later: bool) -> String {
    let value = value.trim();
    if !value.is_empty() {
        return value.to_string();
    }
    if later {
        return "evening".to_string();
    }
    String::new()
}
