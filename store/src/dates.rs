//! Things date encodings.
//!
//! `startDate` and `deadline` are packed day numbers:
//! `year << 16 | month << 12 | day << 7`. Timestamps (`creationDate`,
//! `userModificationDate`, `stopDate`) are Unix seconds stored as REAL.

use chrono::DateTime;
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::SecondsFormat;
use chrono::Utc;

pub fn pack_date(date: NaiveDate) -> i64 {
    (i64::from(date.year()) << 16) | (i64::from(date.month()) << 12) | (i64::from(date.day()) << 7)
}

pub fn unpack_date(packed: i64) -> Option<NaiveDate> {
    if packed <= 0 {
        return None;
    }
    let year = i32::try_from(packed >> 16).ok()?;
    let month = u32::try_from((packed >> 12) & 0xF).ok()?;
    let day = u32::try_from((packed >> 7) & 0x1F).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-MM-DD` for a packed date, empty when absent or invalid.
pub(crate) fn packed_to_string(packed: Option<i64>) -> String {
    packed
        .and_then(unpack_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// RFC3339 (UTC, second precision) for a Unix timestamp, empty when absent.
pub(crate) fn timestamp_to_string(secs: Option<f64>) -> String {
    secs.and_then(|s| DateTime::<Utc>::from_timestamp(s.trunc() as i64, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub(crate) fn to_timestamp<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> f64 {
    at.timestamp() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn packs_and_unpacks() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let packed = pack_date(date);
        assert_eq!(packed, (2026 << 16) | (1 << 12) | (2 << 7));
        assert_eq!(unpack_date(packed), Some(date));
        assert_eq!(packed_to_string(Some(packed)), "2026-01-02");
    }

    #[test]
    fn invalid_packed_values_are_empty() {
        assert_eq!(unpack_date(0), None);
        assert_eq!(packed_to_string(None), "");
        // month 0 is not a date
        assert_eq!(unpack_date(2026 << 16), None);
    }

    #[test]
    fn timestamps_render_as_utc() {
        assert_eq!(timestamp_to_string(Some(0.5)), "1970-01-01T00:00:00Z");
        assert_eq!(timestamp_to_string(None), "");
    }
}
