//! Conversions between canonical timestamp text and epoch milliseconds.
//!
//! Every comparison in the domain happens in epoch-millisecond space; text
//! only exists at the edges.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::error::DomainError;

pub const HOUR_MS: i64 = 3_600_000;

/// Inclusive length of a slot: it ends one millisecond before the next hour.
pub const SLOT_SPAN_MS: i64 = HOUR_MS - 1;

/// Source of "now" for the services.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Parse an RFC 3339 timestamp with an explicit offset.
pub fn parse_timestamp(text: &str) -> Result<i64, DomainError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| DomainError::malformed("begins_at", format!("'{text}' is not RFC 3339: {e}")))
}

/// Format epoch milliseconds as RFC 3339 UTC (`Z` suffix). Sub-second
/// digits appear only when non-zero, so parsing the output is lossless.
pub fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub const fn is_hour_aligned(millis: i64) -> bool {
    millis.rem_euclid(HOUR_MS) == 0
}

pub const fn slot_end(begins_at: i64) -> i64 {
    begins_at + SLOT_SPAN_MS
}

/// UTC month window `[start, end)` selected by a `YYYY-MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: i64,
    pub end: i64,
}

impl MonthWindow {
    pub fn parse(selector: &str) -> Result<Self, DomainError> {
        let malformed = || {
            DomainError::malformed("month", format!("'{selector}' is not in YYYY-MM format"))
        };

        let bytes = selector.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(malformed());
        }

        let year: i32 = selector[..4].parse().map_err(|_| malformed())?;
        let month: u32 = selector[5..].parse().map_err(|_| malformed())?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let start = month_start_millis(year, month).ok_or_else(malformed)?;
        let end = month_start_millis(next_year, next_month).ok_or_else(malformed)?;
        Ok(Self { start, end })
    }
}

fn month_start_millis(year: i32, month: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
