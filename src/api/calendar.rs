//! Calendar feed request and decoder.
//!
//! The feed is a JSON array of events. `start`/`end` may be epoch seconds
//! (integer or float) or ISO-8601 text; both are normalised to UTC seconds.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use serde::Deserialize;

use super::timestamp::parse_iso8601;
use super::weather::Url;
use crate::config::MAX_EVENTS;
use crate::data::{bounded, CalendarEvent, EventList};
use crate::error::{FetchError, PayloadKind};

/// Append `?max=N` unless the configured URL already carries a query.
pub fn calendar_url(base: &str, max_items: usize) -> Option<Url> {
    let mut url = Url::new();
    url.push_str(base).ok()?;
    if !base.contains('?') {
        write!(url, "?max={max_items}").ok()?;
    }
    Some(url)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTime {
    Seconds(i64),
    Fractional(f64),
    Text(String),
}

impl WireTime {
    fn to_utc(&self) -> Result<i64, PayloadKind> {
        match self {
            WireTime::Seconds(s) => Ok(*s),
            WireTime::Fractional(f) => Ok(*f as i64),
            WireTime::Text(s) => parse_iso8601(s),
        }
    }
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start: Option<WireTime>,
    #[serde(default)]
    end: Option<WireTime>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "allDay")]
    all_day: Option<bool>,
}

impl WireEvent {
    fn into_event(self) -> Result<CalendarEvent, PayloadKind> {
        let utc = |t: &Option<WireTime>| t.as_ref().map_or(Ok(0), WireTime::to_utc);
        Ok(CalendarEvent {
            id: bounded(self.id.as_deref().unwrap_or("")),
            title: bounded(self.title.as_deref().unwrap_or("")),
            start_utc: utc(&self.start)?,
            end_utc: utc(&self.end)?,
            location: bounded(self.location.as_deref().unwrap_or("")),
            all_day: self.all_day.unwrap_or(false),
        })
    }
}

/// Decode a feed body into at most `max_items` events, earliest first.
///
/// The whole array is sorted before truncating, so an unordered feed still
/// yields the soonest events. A single bad timestamp fails the fetch.
pub fn parse_calendar(body: &[u8], max_items: usize) -> Result<EventList, FetchError> {
    let wire: Vec<WireEvent> = serde_json::from_slice(body)?;

    let mut events = wire
        .into_iter()
        .map(WireEvent::into_event)
        .collect::<Result<Vec<_>, _>>()?;
    events.sort_by_key(|e| e.start_utc);

    let keep = max_items.min(MAX_EVENTS);
    Ok(events.into_iter().take(keep).collect())
}
