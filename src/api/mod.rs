//! Remote data sources - URL builders and payload decoders.
//!
//! Everything here is pure: the embedded HTTP transport (`net::http`) hands
//! the raw body to these decoders, and the host tests feed them fixtures.
//!
//! ## Sources
//!
//! - **Weather**: OpenWeatherMap "current weather" JSON
//! - **Calendar**: array of events, start/end as epoch or ISO-8601
//! - **Aggregate**: subscriber count, BTC/ETH prices and three headlines

pub mod aggregate;
pub mod calendar;
pub mod thingspeak;
pub mod timestamp;
pub mod weather;

use crate::data::{AggregateSnapshot, EventList, WeatherSnapshot};
use crate::error::{FetchError, PayloadKind};

/// The three blocking "fetch now" operations the scheduler drives.
///
/// Each call runs to completion (or to its own timeout) before the loop
/// continues; there is no cancellation.
pub trait Fetcher {
    async fn fetch_weather(&mut self) -> Result<WeatherSnapshot, FetchError>;

    /// At most `max_items` events, ascending by start time.
    async fn fetch_calendar(&mut self, max_items: usize) -> Result<EventList, FetchError>;

    async fn fetch_aggregate(&mut self) -> Result<AggregateSnapshot, FetchError>;

    /// Forward a fresh aggregate upstream. Called once per successful
    /// aggregate refresh, after the update has been rendered.
    async fn publish_aggregate(&mut self, _aggregate: &AggregateSnapshot) -> Result<(), FetchError> {
        Ok(())
    }
}

/// Map an HTTP status to success or [`FetchError::Protocol`].
pub fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Protocol(status))
    }
}

/// Reject a body whose top level is an array before handing it to a
/// derived struct decoder, which would otherwise read it positionally.
/// Scalars and malformed JSON are left for serde to classify.
pub fn reject_array(body: &[u8]) -> Result<(), FetchError> {
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Err(PayloadKind::Shape.into()),
        _ => Ok(()),
    }
}
