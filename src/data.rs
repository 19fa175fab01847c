//! Cached dashboard data.
//!
//! One [`CachedResult`] per remote source, bundled in [`DashboardData`].
//! Only the refresh scheduler writes here; renderers get `&DashboardData`.

use heapless::{String, Vec};

use crate::config::{HEADLINE_COUNT, MAX_EVENTS};

/// Copy `s` into a fixed-capacity string, dropping whole characters that
/// do not fit.
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════
// Payloads
// ═══════════════════════════════════════════════════════════════════════════

/// Current conditions from the weather endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherSnapshot {
    /// Degrees in the configured unit system.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    /// Provider icon token, e.g. `"01d"`.
    pub icon: String<4>,
    /// Free-text description, truncated.
    pub description: String<32>,
}

impl WeatherSnapshot {
    pub fn condition(&self) -> WeatherIcon {
        WeatherIcon::from_code(&self.icon)
    }
}

/// Coarse condition class derived from the provider's icon token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WeatherIcon {
    Clear,
    FewClouds,
    Cloudy,
    Rain,
    Storm,
    Snow,
    Mist,
    Unknown,
}

impl WeatherIcon {
    /// Map an OpenWeatherMap icon code (`01d`, `10n`, ...) to a class.
    /// Only the two-digit prefix matters; day/night is ignored.
    pub fn from_code(code: &str) -> Self {
        match code.get(..2) {
            Some("01") => WeatherIcon::Clear,
            Some("02") => WeatherIcon::FewClouds,
            Some("03") | Some("04") => WeatherIcon::Cloudy,
            Some("09") | Some("10") => WeatherIcon::Rain,
            Some("11") => WeatherIcon::Storm,
            Some("13") => WeatherIcon::Snow,
            Some("50") => WeatherIcon::Mist,
            _ => WeatherIcon::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "clear",
            WeatherIcon::FewClouds => "few clouds",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Storm => "storm",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Mist => "mist",
            WeatherIcon::Unknown => "n/a",
        }
    }
}

/// One upcoming calendar entry. Times are UTC epoch seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarEvent {
    pub id: String<32>,
    pub title: String<48>,
    pub start_utc: i64,
    pub end_utc: i64,
    pub location: String<32>,
    pub all_day: bool,
}

/// Upcoming events, ascending by `start_utc`.
pub type EventList = Vec<CalendarEvent, MAX_EVENTS>;

pub type Headline = String<64>;

/// Social / crypto / news bundle served by the aggregate endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregateSnapshot {
    pub subscriber_count: u64,
    pub btc_usd: f32,
    pub eth_usd: f32,
    pub headlines: [Headline; HEADLINE_COUNT],
}

// ═══════════════════════════════════════════════════════════════════════════
// Cache
// ═══════════════════════════════════════════════════════════════════════════

/// Last-known-good value of one source.
///
/// `valid` flips to true on the first successful fetch and never goes back;
/// failures leave both the value and `last_good_at` untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CachedResult<T> {
    value: T,
    last_good_at: u64,
    valid: bool,
}

impl<T: Default> CachedResult<T> {
    /// Never-fetched state.
    pub fn empty() -> Self {
        Self {
            value: T::default(),
            last_good_at: 0,
            valid: false,
        }
    }
}

impl<T> CachedResult<T> {
    /// Swap in a freshly fetched value.
    pub fn store(&mut self, value: T, now_ms: u64) {
        self.value = value;
        self.last_good_at = now_ms;
        self.valid = true;
    }

    /// The cached value, or `None` if no fetch has succeeded yet.
    pub fn get(&self) -> Option<&T> {
        if self.valid {
            Some(&self.value)
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Monotonic time of the last successful fetch (0 if never).
    pub fn last_good_at(&self) -> u64 {
        self.last_good_at
    }
}

/// Everything the screens can show, one cache per source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardData {
    pub weather: CachedResult<WeatherSnapshot>,
    pub events: CachedResult<EventList>,
    pub aggregate: CachedResult<AggregateSnapshot>,
}

impl DashboardData {
    pub fn new() -> Self {
        Self {
            weather: CachedResult::empty(),
            events: CachedResult::empty(),
            aggregate: CachedResult::empty(),
        }
    }
}
