//! Date/time normalisation to UTC epoch seconds.
//!
//! Accepted text forms:
//! ```text
//! 2024-01-01                  all-day date, midnight UTC
//! 2024-01-01T10:00:00         no offset, taken as UTC
//! 2024-01-01T10:00:00Z
//! 2024-01-01T10:00:00+07:00   explicit offset, converted to UTC
//! ```

use jiff::civil::{Date, DateTime, Time};
use jiff::tz::Offset;
use jiff::Timestamp;

use crate::error::PayloadKind;

/// Parse an ISO-8601 / RFC 3339 string into UTC epoch seconds.
pub fn parse_iso8601(s: &str) -> Result<i64, PayloadKind> {
    let s = s.trim();

    // Carries its own offset (`Z` or `±HH:MM`).
    if let Ok(ts) = s.parse::<Timestamp>() {
        return Ok(ts.as_second());
    }

    // Wall-clock without offset: interpret as UTC.
    let civil = match s.parse::<DateTime>() {
        Ok(dt) => dt,
        Err(_) => s
            .parse::<Date>()
            .map_err(|_| PayloadKind::Timestamp)?
            .to_datetime(Time::midnight()),
    };

    Offset::UTC
        .to_timestamp(civil)
        .map(|ts| ts.as_second())
        .map_err(|_| PayloadKind::Timestamp)
}
