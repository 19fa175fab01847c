//! Integration tests for infodash host-testable logic.
//!
//! A canned fetcher feeds real response bodies through the payload decoders,
//! so these cover decoding, scheduling, caching and view building together.

use std::collections::VecDeque;

use embassy_futures::block_on;

use infodash::api::aggregate::parse_aggregate;
use infodash::api::calendar::parse_calendar;
use infodash::api::weather::parse_weather;
use infodash::api::Fetcher;
use infodash::config::{MAX_EVENTS, WEATHER_REFRESH_MS, WEATHER_RETRY_MS};
use infodash::data::{AggregateSnapshot, DashboardData, EventList, WeatherSnapshot};
use infodash::error::{FetchError, TransportKind};
use infodash::scheduler::Source;
use infodash::ui::view::{Frame, View};
use infodash::ui::{Level, ScreenId};
use infodash::{Dashboard, Renderer, TickInput};

const DOWN: FetchError = FetchError::Transport(TransportKind::Io);

/// Serves queued bodies per source; an empty queue behaves like a dead link.
#[derive(Default)]
struct Canned {
    weather: VecDeque<&'static str>,
    calendar: VecDeque<&'static str>,
    aggregate: VecDeque<&'static str>,
    calls: usize,
}

impl Fetcher for Canned {
    async fn fetch_weather(&mut self) -> Result<WeatherSnapshot, FetchError> {
        self.calls += 1;
        parse_weather(self.weather.pop_front().ok_or(DOWN)?.as_bytes())
    }

    async fn fetch_calendar(&mut self, max_items: usize) -> Result<EventList, FetchError> {
        self.calls += 1;
        parse_calendar(self.calendar.pop_front().ok_or(DOWN)?.as_bytes(), max_items)
    }

    async fn fetch_aggregate(&mut self) -> Result<AggregateSnapshot, FetchError> {
        self.calls += 1;
        parse_aggregate(self.aggregate.pop_front().ok_or(DOWN)?.as_bytes())
    }
}

#[derive(Default)]
struct Recorder {
    frames: Vec<Frame>,
}

impl Renderer for Recorder {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

fn tick(d: &mut Dashboard, f: &mut Canned, r: &mut Recorder, now_ms: u64, online: bool) {
    let input = TickInput {
        now_ms,
        button: Level::High,
        wall_clock: None,
        online,
    };
    block_on(d.tick(input, f, r));
}

/// Hold the button for `held` ms starting at `at`, then release and let the
/// release settle. Returns the time the next press can start.
fn press(d: &mut Dashboard, f: &mut Canned, r: &mut Recorder, at: u64, held: u64) -> u64 {
    let mut t = at;
    let mut sample = |t: u64, button: Level| {
        let input = TickInput {
            now_ms: t,
            button,
            wall_clock: None,
            online: false,
        };
        block_on(d.tick(input, f, r));
    };
    while t <= at + held {
        sample(t, Level::Low);
        t += 5;
    }
    let released = t;
    while t <= released + 50 {
        sample(t, Level::High);
        t += 5;
    }
    t
}

const WEATHER_BODY: &str = r#"{
    "main": {"temp": 31.6, "humidity": 70},
    "weather": [{"icon": "02d", "description": "few clouds"}]
}"#;

const SEVEN_EVENTS: &str = r#"[
    {"title": "Review",   "start": "2024-01-01T06:00:00Z"},
    {"title": "Standup",  "start": "2024-01-01T02:00:00Z"},
    {"title": "Gym",      "start": "2024-01-01T12:00:00Z"},
    {"title": "Lunch",    "start": "2024-01-01T05:00:00Z"},
    {"title": "Dinner",   "start": "2024-01-01T13:00:00Z"},
    {"title": "Focus",    "start": "2024-01-01T03:00:00Z"},
    {"title": "Holiday",  "start": "2024-01-01", "allDay": true}
]"#;

#[test]
fn never_fetched_sources_render_placeholders() {
    let data = DashboardData::new();

    match View::build(ScreenId::Weather, &data, None) {
        View::Weather {
            temperature,
            humidity,
            ..
        } => {
            assert_eq!(temperature.as_str(), "--");
            assert_eq!(humidity.as_str(), "Hum --%");
        }
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::Events, &data, None) {
        View::Events { lines } => assert_eq!(lines[0].as_str(), "No events"),
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::Social, &data, None) {
        View::Social { subscribers } => assert_eq!(subscribers.as_str(), "Subs: --"),
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::Crypto, &data, None) {
        View::Crypto { btc, .. } => assert_eq!(btc.as_str(), "BTC --"),
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::News, &data, None) {
        View::News { headlines } => assert_eq!(headlines[0].as_str(), "--"),
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::Clock, &data, None) {
        View::Clock { time, .. } => assert_eq!(time.as_str(), "--:--:--"),
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn unordered_feed_keeps_earliest_events() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    f.calendar.push_back(SEVEN_EVENTS);
    let mut r = Recorder::default();

    tick(&mut d, &mut f, &mut r, 0, true);

    let events = d.data().events.get().expect("calendar stored");
    assert_eq!(events.len(), MAX_EVENTS);
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Holiday", "Standup", "Focus", "Lunch", "Review"]);
    assert!(events.windows(2).all(|w| w[0].start_utc <= w[1].start_utc));

    match View::build(ScreenId::Events, d.data(), None) {
        View::Events { lines } => {
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[0].as_str(), "Holiday  All-day");
            assert_eq!(lines[1].as_str(), "Standup  09:00");
            assert_eq!(lines[2].as_str(), "Focus  10:00");
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn offset_times_are_normalised_to_utc() {
    let body = r#"[
        {"title": "Call", "start": "2024-03-10T09:30:00+07:00", "end": "2024-03-10T10:00:00+07:00"}
    ]"#;
    let events = parse_calendar(body.as_bytes(), MAX_EVENTS).unwrap();
    // 2024-03-10T02:30:00Z
    assert_eq!(events[0].start_utc, 1_710_037_800);
    assert_eq!(events[0].end_utc, 1_710_037_800 + 1_800);
}

#[test]
fn failed_refresh_keeps_last_good_weather() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    f.weather.push_back(WEATHER_BODY);
    let mut r = Recorder::default();

    tick(&mut d, &mut f, &mut r, 0, true);
    let stored = d.data().weather.get().cloned().expect("weather stored");
    assert_eq!(d.data().weather.last_good_at(), 0);

    // Next refresh fails: value kept, retry scheduled sooner.
    tick(&mut d, &mut f, &mut r, WEATHER_REFRESH_MS, true);
    assert_eq!(d.data().weather.get(), Some(&stored));
    assert_eq!(d.data().weather.last_good_at(), 0);
    assert_eq!(
        d.scheduler().timer(Source::Weather).next_due_at(),
        WEATHER_REFRESH_MS + WEATHER_RETRY_MS
    );

    match View::build(ScreenId::Weather, d.data(), None) {
        View::Weather {
            temperature,
            description,
            humidity,
            ..
        } => {
            assert_eq!(temperature.as_str(), "32C");
            assert_eq!(description.as_str(), "few clouds");
            assert_eq!(humidity.as_str(), "Hum 70%");
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn aggregate_feeds_three_screens() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    f.aggregate.push_back(
        r#"{"youtube": 123456, "btc": 65000, "eth": 3400,
            "rss": [{"title": "Rates unchanged"}, {"title": "Rain expected"}]}"#,
    );
    let mut r = Recorder::default();

    tick(&mut d, &mut f, &mut r, 0, true);

    match View::build(ScreenId::Social, d.data(), None) {
        View::Social { subscribers } => assert_eq!(subscribers.as_str(), "Subs: 123k"),
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::Crypto, d.data(), None) {
        View::Crypto { btc, eth, ratio } => {
            assert_eq!(btc.as_str(), "BTC 65k");
            assert_eq!(eth.as_str(), "ETH 3.4k");
            assert_eq!(ratio.as_str(), "BTC/ETH 19.1");
        }
        other => panic!("unexpected view {other:?}"),
    }
    match View::build(ScreenId::News, d.data(), None) {
        View::News { headlines } => {
            assert_eq!(headlines.len(), 2);
            assert_eq!(headlines[0].as_str(), "Rates unchanged");
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn short_presses_cycle_all_screens_and_wrap() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    let mut r = Recorder::default();
    d.start(&mut r, None, false);

    let mut t = 100;
    let mut seen = vec![d.screen()];
    for _ in 0..ScreenId::ALL.len() {
        t = press(&mut d, &mut f, &mut r, t, 100);
        seen.push(d.screen());
    }

    assert_eq!(
        seen,
        [
            ScreenId::Clock,
            ScreenId::Weather,
            ScreenId::Events,
            ScreenId::Social,
            ScreenId::Crypto,
            ScreenId::News,
            ScreenId::Clock,
        ]
    );
    // Every switch was drawn once, after the initial frame.
    assert_eq!(r.frames.len(), 1 + ScreenId::ALL.len());
}

#[test]
fn long_press_goes_back() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    let mut r = Recorder::default();

    let t = press(&mut d, &mut f, &mut r, 100, 700);
    assert_eq!(d.screen(), ScreenId::News);
    press(&mut d, &mut f, &mut r, t, 700);
    assert_eq!(d.screen(), ScreenId::Crypto);
}

#[test]
fn bounces_shorter_than_window_are_ignored() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    let mut r = Recorder::default();

    // 20 ms low blips, well inside the debounce window.
    let mut t = 0;
    for _ in 0..5 {
        for level in [Level::Low, Level::Low, Level::Low, Level::Low, Level::High] {
            let input = TickInput {
                now_ms: t,
                button: level,
                wall_clock: None,
                online: false,
            };
            block_on(d.tick(input, &mut f, &mut r));
            t += 5;
        }
        for _ in 0..10 {
            tick(&mut d, &mut f, &mut r, t, false);
            t += 5;
        }
    }
    assert_eq!(d.screen(), ScreenId::Clock);
}

#[test]
fn nothing_is_fetched_while_offline() {
    let mut d = Dashboard::new(0).unwrap();
    let mut f = Canned::default();
    f.weather.push_back(WEATHER_BODY);
    let mut r = Recorder::default();

    for t in 0..20 {
        tick(&mut d, &mut f, &mut r, t * 60_000, false);
    }
    assert_eq!(f.calls, 0);
    assert!(!d.data().weather.is_valid());

    // First online tick services every overdue source.
    tick(&mut d, &mut f, &mut r, 20 * 60_000, true);
    assert_eq!(f.calls, 3);
    assert!(d.data().weather.is_valid());
}
