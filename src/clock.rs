//! Wall-clock tracking and local-time conversion.
//!
//! NTP gives a UTC epoch once in a while; between syncs the wall clock is
//! extrapolated from the monotonic millisecond counter.

use jiff::civil::{DateTime, Weekday};
use jiff::tz::Offset;
use jiff::Timestamp;

/// Anchor pairing one NTP reading with the monotonic time it was taken at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallClock {
    anchor: Option<(i64, u64)>,
}

impl WallClock {
    pub const fn unsynced() -> Self {
        Self { anchor: None }
    }

    /// Record that `unix_secs` was the UTC time at monotonic `now_ms`.
    pub fn sync(&mut self, unix_secs: i64, now_ms: u64) {
        self.anchor = Some((unix_secs, now_ms));
    }

    /// UTC epoch seconds at monotonic `now_ms`, or `None` before the first sync.
    pub fn now(&self, now_ms: u64) -> Option<i64> {
        let (secs, at_ms) = self.anchor?;
        let elapsed = now_ms.saturating_sub(at_ms) / 1000;
        Some(secs.saturating_add(elapsed as i64))
    }
}

/// Civil date/time at a fixed UTC offset.
pub fn local_datetime(unix_secs: i64, offset_secs: i32) -> Option<DateTime> {
    let ts = Timestamp::from_second(unix_secs).ok()?;
    let offset = Offset::from_seconds(offset_secs).ok()?;
    Some(offset.to_datetime(ts))
}

pub fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}
