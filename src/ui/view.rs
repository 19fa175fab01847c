//! Per-screen render model.
//!
//! [`View::build`] turns the cache into the exact text each screen shows, so
//! everything visible is host-testable and the pixel renderer only lays
//! lines out. A source that never succeeded renders as a placeholder.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::clock::{local_datetime, weekday_abbrev};
use crate::config::{
    EVENTS_ON_SCREEN, EVENT_TITLE_CHARS, HEADLINE_COUNT, LINE_CHARS, OWM_UNITS, UTC_OFFSET_SECS,
};
use crate::data::{AggregateSnapshot, CalendarEvent, DashboardData, WeatherIcon, WeatherSnapshot};
use crate::ui::ScreenId;

/// One line of text, sized in bytes for `LINE_CHARS` four-byte chars so a
/// trimmed line or an event suffix always fits. Renderers clip to the panel.
pub type Line = String<{ 4 * LINE_CHARS }>;

pub const PLACEHOLDER: &str = "--";
pub const NO_EVENTS: &str = "No events";

// ═══════════════════════════════════════════════════════════════════════════
// Views
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum View {
    Clock {
        time: Line,
        date: Line,
    },
    Weather {
        icon: WeatherIcon,
        temperature: Line,
        description: Line,
        humidity: Line,
    },
    Events {
        lines: Vec<Line, EVENTS_ON_SCREEN>,
    },
    Social {
        subscribers: Line,
    },
    Crypto {
        btc: Line,
        eth: Line,
        ratio: Line,
    },
    News {
        headlines: Vec<Line, HEADLINE_COUNT>,
    },
}

impl View {
    /// Build the view for `screen` from the cache. `wall_clock` is UTC epoch
    /// seconds, `None` until the first time sync.
    pub fn build(screen: ScreenId, data: &DashboardData, wall_clock: Option<i64>) -> Self {
        match screen {
            ScreenId::Clock => clock_view(wall_clock),
            ScreenId::Weather => weather_view(data.weather.get()),
            ScreenId::Events => events_view(data.events.get().map(|e| e.as_slice())),
            ScreenId::Social => social_view(data.aggregate.get()),
            ScreenId::Crypto => crypto_view(data.aggregate.get()),
            ScreenId::News => news_view(data.aggregate.get()),
        }
    }

    pub fn screen(&self) -> ScreenId {
        match self {
            View::Clock { .. } => ScreenId::Clock,
            View::Weather { .. } => ScreenId::Weather,
            View::Events { .. } => ScreenId::Events,
            View::Social { .. } => ScreenId::Social,
            View::Crypto { .. } => ScreenId::Crypto,
            View::News { .. } => ScreenId::News,
        }
    }
}

/// Everything a renderer needs for one redraw.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub view: View,
    /// Network link indicator in the header.
    pub online: bool,
}

impl Frame {
    pub fn title(&self) -> &'static str {
        self.view.screen().title()
    }
}

fn line(s: &str) -> Line {
    crate::data::bounded(s)
}

fn clock_view(wall_clock: Option<i64>) -> View {
    let local = wall_clock.and_then(|t| local_datetime(t, UTC_OFFSET_SECS));
    let Some(dt) = local else {
        return View::Clock {
            time: line("--:--:--"),
            date: line("Syncing time"),
        };
    };

    let mut time = Line::new();
    let _ = write!(time, "{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second());
    let mut date = Line::new();
    let _ = write!(
        date,
        "{} {:02}/{:02}/{}",
        weekday_abbrev(dt.weekday()),
        dt.day(),
        dt.month(),
        dt.year()
    );
    View::Clock { time, date }
}

fn weather_view(weather: Option<&WeatherSnapshot>) -> View {
    let Some(w) = weather else {
        return View::Weather {
            icon: WeatherIcon::Unknown,
            temperature: line(PLACEHOLDER),
            description: line("n/a"),
            humidity: line("Hum --%"),
        };
    };

    let unit = if OWM_UNITS.starts_with('m') { 'C' } else { 'F' };
    let mut temperature = Line::new();
    let _ = write!(temperature, "{}{}", round_i32(w.temperature), unit);

    let description = if w.description.is_empty() {
        line(w.condition().label())
    } else {
        trim_to_width(&w.description, LINE_CHARS)
    };

    let mut humidity = Line::new();
    let _ = write!(humidity, "Hum {}%", round_i32(w.humidity));

    View::Weather {
        icon: w.condition(),
        temperature,
        description,
        humidity,
    }
}

fn events_view(events: Option<&[CalendarEvent]>) -> View {
    let mut lines = Vec::new();
    match events {
        Some(list) if !list.is_empty() => {
            for ev in list.iter().take(EVENTS_ON_SCREEN) {
                let _ = lines.push(event_line(ev, UTC_OFFSET_SECS));
            }
        }
        _ => {
            let _ = lines.push(line(NO_EVENTS));
        }
    }
    View::Events { lines }
}

fn social_view(agg: Option<&AggregateSnapshot>) -> View {
    let mut subscribers = Line::new();
    let _ = match agg {
        Some(a) => write!(subscribers, "Subs: {}", compact(a.subscriber_count as f64)),
        None => write!(subscribers, "Subs: {PLACEHOLDER}"),
    };
    View::Social { subscribers }
}

fn crypto_view(agg: Option<&AggregateSnapshot>) -> View {
    let (mut btc, mut eth, mut ratio) = (Line::new(), Line::new(), Line::new());
    match agg {
        Some(a) => {
            let _ = write!(btc, "BTC {}", compact(a.btc_usd as f64));
            let _ = write!(eth, "ETH {}", compact(a.eth_usd as f64));
            if a.eth_usd > 0.0 {
                let _ = write!(ratio, "BTC/ETH {:.1}", a.btc_usd / a.eth_usd);
            } else {
                let _ = write!(ratio, "BTC/ETH {PLACEHOLDER}");
            }
        }
        None => {
            let _ = write!(btc, "BTC {PLACEHOLDER}");
            let _ = write!(eth, "ETH {PLACEHOLDER}");
            let _ = write!(ratio, "BTC/ETH {PLACEHOLDER}");
        }
    }
    View::Crypto { btc, eth, ratio }
}

fn news_view(agg: Option<&AggregateSnapshot>) -> View {
    let mut headlines = Vec::new();
    if let Some(a) = agg {
        for h in a.headlines.iter().filter(|h| !h.is_empty()) {
            let _ = headlines.push(trim_to_width(h, LINE_CHARS));
        }
    }
    if headlines.is_empty() {
        let _ = headlines.push(line(PLACEHOLDER));
    }
    View::News { headlines }
}

// ═══════════════════════════════════════════════════════════════════════════
// Text helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Round half away from zero. NaN maps to 0.
pub fn round_i32(x: f32) -> i32 {
    if x >= 0.0 {
        (x + 0.5) as i32
    } else {
        (x - 0.5) as i32
    }
}

/// `s` unchanged if it fits in `max` chars, else its first `max - 3` chars
/// followed by `...`.
pub fn trim_to_width(s: &str, max: usize) -> Line {
    if s.chars().count() <= max {
        return line(s);
    }
    let mut out = Line::new();
    for c in s.chars().take(max.saturating_sub(3)) {
        let _ = out.push(c);
    }
    let _ = out.push_str("...");
    out
}

/// Short human form: `950`, `3.1k`, `123k`, `1.2M`, `45M`. The unit is
/// picked after rounding, so `9999.9` is `10k`, never `10.0k`.
pub fn compact(value: f64) -> String<12> {
    let mut out = String::new();
    let v = if value.is_finite() && value > 0.0 { value } else { 0.0 };
    let _ = if v < 999.5 {
        write!(out, "{}", (v + 0.5) as u64)
    } else if v < 9_950.0 {
        write!(out, "{:.1}k", v / 1_000.0)
    } else if v < 999_500.0 {
        write!(out, "{}k", (v / 1_000.0 + 0.5) as u64)
    } else if v < 9_950_000.0 {
        write!(out, "{:.1}M", v / 1_000_000.0)
    } else {
        write!(out, "{}M", (v / 1_000_000.0 + 0.5) as u64)
    };
    out
}

/// `HH:MM` of `unix_secs` at the given offset, `--:--` if out of range.
pub fn hh_mm(unix_secs: i64, offset_secs: i32) -> String<8> {
    let mut out = String::new();
    let _ = match local_datetime(unix_secs, offset_secs) {
        Some(dt) => write!(out, "{:02}:{:02}", dt.hour(), dt.minute()),
        None => write!(out, "--:--"),
    };
    out
}

/// First 12 title chars, two spaces, then `All-day` or the local start time.
pub fn event_line(ev: &CalendarEvent, offset_secs: i32) -> Line {
    let mut out = Line::new();
    for c in ev.title.chars().take(EVENT_TITLE_CHARS) {
        let _ = out.push(c);
    }
    let _ = out.push_str("  ");
    if ev.all_day {
        let _ = out.push_str("All-day");
    } else {
        let _ = out.push_str(&hh_mm(ev.start_utc, offset_secs));
    }
    out
}
