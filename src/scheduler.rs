//! Refresh scheduler.
//!
//! One [`RefreshTimer`] per remote source. A due source is fetched, the
//! outcome reschedules its timer (normal interval on success, retry interval
//! on failure) and only a success touches the cache.
//!
//! Sources are always serviced in [`Source::PRIORITY`] order, and the update
//! callback runs before the next source is checked, so a render can never be
//! reordered relative to the update that caused it.

use crate::api::Fetcher;
use crate::config::{
    AGGREGATE_REFRESH_MS, AGGREGATE_RETRY_MS, CALENDAR_REFRESH_MS, CALENDAR_RETRY_MS, MAX_EVENTS,
    WEATHER_REFRESH_MS, WEATHER_RETRY_MS,
};
use crate::data::{AggregateSnapshot, DashboardData, EventList, WeatherSnapshot};
use crate::error::{Error, FetchError};
use crate::ui::ScreenId;

// ═══════════════════════════════════════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    Weather,
    Calendar,
    Aggregate,
}

impl Source {
    /// Fixed servicing order within one tick.
    pub const PRIORITY: [Source; 3] = [Source::Weather, Source::Calendar, Source::Aggregate];

    /// Whether fresh data from this source changes what `screen` shows.
    pub fn backs(self, screen: ScreenId) -> bool {
        matches!(
            (self, screen),
            (Source::Weather, ScreenId::Weather)
                | (Source::Calendar, ScreenId::Events)
                | (
                    Source::Aggregate,
                    ScreenId::Social | ScreenId::Crypto | ScreenId::News
                )
        )
    }

    /// `(normal, retry)` intervals in milliseconds.
    pub const fn intervals(self) -> (u64, u64) {
        match self {
            Source::Weather => (WEATHER_REFRESH_MS, WEATHER_RETRY_MS),
            Source::Calendar => (CALENDAR_REFRESH_MS, CALENDAR_RETRY_MS),
            Source::Aggregate => (AGGREGATE_REFRESH_MS, AGGREGATE_RETRY_MS),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Timer
// ═══════════════════════════════════════════════════════════════════════════

/// When a source is next due. Times are monotonic milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshTimer {
    next_due_at: u64,
    normal_interval: u64,
    retry_interval: u64,
}

impl RefreshTimer {
    /// A timer that is due immediately. `retry` must be shorter than `normal`.
    pub fn new(now: u64, normal: u64, retry: u64) -> Result<Self, Error> {
        if retry >= normal {
            return Err(Error::InvalidInterval);
        }
        Ok(Self {
            next_due_at: now,
            normal_interval: normal,
            retry_interval: retry,
        })
    }

    pub fn is_due(&self, now: u64) -> bool {
        now >= self.next_due_at
    }

    pub fn next_due_at(&self) -> u64 {
        self.next_due_at
    }

    pub fn on_success(&mut self, now: u64) {
        self.next_due_at = now.saturating_add(self.normal_interval);
    }

    pub fn on_failure(&mut self, now: u64) {
        self.next_due_at = now.saturating_add(self.retry_interval);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Scheduler
// ═══════════════════════════════════════════════════════════════════════════

/// Result of one fetch, tagged with its source.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Weather(Result<WeatherSnapshot, FetchError>),
    Calendar(Result<EventList, FetchError>),
    Aggregate(Result<AggregateSnapshot, FetchError>),
}

impl FetchOutcome {
    pub fn source(&self) -> Source {
        match self {
            FetchOutcome::Weather(_) => Source::Weather,
            FetchOutcome::Calendar(_) => Source::Calendar,
            FetchOutcome::Aggregate(_) => Source::Aggregate,
        }
    }

    pub fn error(&self) -> Option<FetchError> {
        match self {
            FetchOutcome::Weather(r) => r.as_ref().err().copied(),
            FetchOutcome::Calendar(r) => r.as_ref().err().copied(),
            FetchOutcome::Aggregate(r) => r.as_ref().err().copied(),
        }
    }
}

/// Run the fetch operation for `source`.
pub async fn fetch<F: Fetcher>(fetcher: &mut F, source: Source) -> FetchOutcome {
    match source {
        Source::Weather => FetchOutcome::Weather(fetcher.fetch_weather().await),
        Source::Calendar => FetchOutcome::Calendar(fetcher.fetch_calendar(MAX_EVENTS).await),
        Source::Aggregate => FetchOutcome::Aggregate(fetcher.fetch_aggregate().await),
    }
}

/// Timers plus the cache they keep fresh. Sole writer of [`DashboardData`].
pub struct Scheduler {
    timers: [RefreshTimer; 3],
    data: DashboardData,
}

impl Scheduler {
    /// All sources due at `now`, with the configured intervals.
    pub fn new(now: u64) -> Result<Self, Error> {
        Self::with_intervals(now, Source::PRIORITY.map(Source::intervals))
    }

    /// Custom `(normal, retry)` per source, indexed in priority order.
    pub fn with_intervals(now: u64, intervals: [(u64, u64); 3]) -> Result<Self, Error> {
        let [w, c, a] = intervals;
        Ok(Self {
            timers: [
                RefreshTimer::new(now, w.0, w.1)?,
                RefreshTimer::new(now, c.0, c.1)?,
                RefreshTimer::new(now, a.0, a.1)?,
            ],
            data: DashboardData::new(),
        })
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn timer(&self, source: Source) -> &RefreshTimer {
        &self.timers[source.slot()]
    }

    pub fn is_due(&self, source: Source, now: u64) -> bool {
        self.timer(source).is_due(now)
    }

    /// Reschedule the outcome's source and, on success, swap the new value
    /// into the cache. Returns `true` if the cache changed.
    ///
    /// An outcome for a source that is not due at `now` is dropped, so a
    /// timer never moves backwards.
    pub fn apply(&mut self, outcome: FetchOutcome, now: u64) -> bool {
        let source = outcome.source();
        let timer = &mut self.timers[source.slot()];
        if !timer.is_due(now) {
            debug!("{} not due until {}, outcome dropped", source, timer.next_due_at());
            return false;
        }

        let stored = match outcome {
            FetchOutcome::Weather(Ok(w)) => {
                info!("weather: {}C {}%", w.temperature, w.humidity);
                self.data.weather.store(w, now);
                true
            }
            FetchOutcome::Calendar(Ok(events)) => {
                info!("calendar: {} events", events.len());
                self.data.events.store(events, now);
                true
            }
            FetchOutcome::Aggregate(Ok(a)) => {
                info!("aggregate: subs={} btc={}", a.subscriber_count, a.btc_usd);
                self.data.aggregate.store(a, now);
                true
            }
            FetchOutcome::Weather(Err(e))
            | FetchOutcome::Calendar(Err(e))
            | FetchOutcome::Aggregate(Err(e)) => {
                log_failure(source, e);
                false
            }
        };

        if stored {
            timer.on_success(now);
        } else {
            timer.on_failure(now);
        }
        trace!("{} next due at {}", source, timer.next_due_at());
        stored
    }

    /// Service every due source in priority order.
    ///
    /// `on_update` runs right after each successful store, before the next
    /// source is looked at. A fresh aggregate is then handed to
    /// [`Fetcher::publish_aggregate`]; its failure does not affect scheduling.
    /// Returns how many sources were updated.
    pub async fn tick<F, U>(&mut self, now: u64, fetcher: &mut F, mut on_update: U) -> usize
    where
        F: Fetcher,
        U: FnMut(Source, &DashboardData),
    {
        let mut updated = 0;
        for source in Source::PRIORITY {
            if !self.is_due(source, now) {
                continue;
            }
            debug!("fetching {}", source);
            let outcome = fetch(fetcher, source).await;
            if !self.apply(outcome, now) {
                continue;
            }
            updated += 1;
            on_update(source, &self.data);

            if let (Source::Aggregate, Some(a)) = (source, self.data.aggregate.get()) {
                if let Err(e) = fetcher.publish_aggregate(a).await {
                    warn!("publish failed: {}", e);
                }
            }
        }
        updated
    }
}

fn log_failure(source: Source, e: FetchError) {
    match e {
        FetchError::Transport(kind) => warn!("{} transport error: {}", source, kind),
        FetchError::Protocol(status) => warn!("{} HTTP status {}", source, status),
        FetchError::Payload(kind) => warn!("{} bad payload: {}", source, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bounded;
    use crate::error::{PayloadKind, TransportKind};
    use embassy_futures::block_on;

    /// Scripted fetcher: every call pops the next result for its source and
    /// records the call order.
    #[derive(Default)]
    struct Scripted {
        weather: std::vec::Vec<Result<WeatherSnapshot, FetchError>>,
        calendar: std::vec::Vec<Result<EventList, FetchError>>,
        aggregate: std::vec::Vec<Result<AggregateSnapshot, FetchError>>,
        calls: std::vec::Vec<Source>,
        published: std::vec::Vec<u64>,
    }

    impl Fetcher for Scripted {
        async fn fetch_weather(&mut self) -> Result<WeatherSnapshot, FetchError> {
            self.calls.push(Source::Weather);
            self.weather.remove(0)
        }

        async fn fetch_calendar(&mut self, _max: usize) -> Result<EventList, FetchError> {
            self.calls.push(Source::Calendar);
            self.calendar.remove(0)
        }

        async fn fetch_aggregate(&mut self) -> Result<AggregateSnapshot, FetchError> {
            self.calls.push(Source::Aggregate);
            self.aggregate.remove(0)
        }

        async fn publish_aggregate(&mut self, a: &AggregateSnapshot) -> Result<(), FetchError> {
            self.published.push(a.subscriber_count);
            Err(TIMEOUT)
        }
    }

    fn weather(temp: f32) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: temp,
            humidity: 50.0,
            icon: bounded("01d"),
            description: bounded("clear sky"),
        }
    }

    const TIMEOUT: FetchError = FetchError::Transport(TransportKind::Timeout);

    #[test]
    fn timer_rejects_retry_not_shorter_than_normal() {
        assert_eq!(RefreshTimer::new(0, 1000, 1000), Err(Error::InvalidInterval));
        assert_eq!(RefreshTimer::new(0, 1000, 2000), Err(Error::InvalidInterval));
        assert!(RefreshTimer::new(0, 1000, 999).is_ok());
    }

    #[test]
    fn timer_is_due_at_creation() {
        let t = RefreshTimer::new(42, 1000, 100).unwrap();
        assert!(t.is_due(42));
        assert!(!t.is_due(41));
    }

    #[test]
    fn timer_success_and_failure_intervals() {
        let mut t = RefreshTimer::new(0, 900_000, 5_000).unwrap();
        t.on_success(1_000);
        assert_eq!(t.next_due_at(), 901_000);
        t.on_failure(901_000);
        assert_eq!(t.next_due_at(), 906_000);
    }

    #[test]
    fn timer_saturates_near_max() {
        let mut t = RefreshTimer::new(0, 1000, 10).unwrap();
        t.on_success(u64::MAX - 5);
        assert_eq!(t.next_due_at(), u64::MAX);
    }

    #[test]
    fn sources_back_their_screens() {
        assert!(Source::Weather.backs(ScreenId::Weather));
        assert!(Source::Calendar.backs(ScreenId::Events));
        assert!(Source::Aggregate.backs(ScreenId::Social));
        assert!(Source::Aggregate.backs(ScreenId::Crypto));
        assert!(Source::Aggregate.backs(ScreenId::News));
        for s in Source::PRIORITY {
            assert!(!s.backs(ScreenId::Clock));
        }
        assert!(!Source::Weather.backs(ScreenId::Events));
    }

    #[test]
    fn configured_intervals_are_valid() {
        assert!(Scheduler::new(0).is_ok());
    }

    #[test]
    fn with_intervals_propagates_invalid() {
        let r = Scheduler::with_intervals(0, [(10, 5), (10, 10), (10, 5)]);
        assert!(matches!(r, Err(Error::InvalidInterval)));
    }

    #[test]
    fn apply_failure_keeps_cache_and_uses_retry() {
        let mut s = Scheduler::with_intervals(0, [(1000, 50), (2000, 100), (3000, 150)]).unwrap();
        assert!(s.apply(FetchOutcome::Weather(Ok(weather(30.0))), 10));
        assert_eq!(s.timer(Source::Weather).next_due_at(), 1010);

        assert!(!s.apply(FetchOutcome::Weather(Err(TIMEOUT)), 1010));
        assert_eq!(s.timer(Source::Weather).next_due_at(), 1060);
        assert_eq!(s.data().weather.get(), Some(&weather(30.0)));
        assert_eq!(s.data().weather.last_good_at(), 10);
    }

    #[test]
    fn apply_never_fetched_failure_stays_invalid() {
        let mut s = Scheduler::new(0).unwrap();
        let bad = FetchError::Payload(PayloadKind::Shape);
        assert!(!s.apply(FetchOutcome::Calendar(Err(bad)), 0));
        assert!(!s.data().events.is_valid());
        assert_eq!(s.timer(Source::Calendar).next_due_at(), CALENDAR_RETRY_MS);
    }

    #[test]
    fn apply_ignores_outcome_for_source_not_due() {
        let mut s = Scheduler::with_intervals(0, [(1000, 50), (2000, 100), (3000, 150)]).unwrap();
        assert!(s.apply(FetchOutcome::Weather(Ok(weather(20.0))), 0));

        assert!(!s.apply(FetchOutcome::Weather(Err(TIMEOUT)), 10));
        assert_eq!(s.timer(Source::Weather).next_due_at(), 1000);

        assert!(!s.apply(FetchOutcome::Weather(Ok(weather(99.0))), 10));
        assert_eq!(s.data().weather.get(), Some(&weather(20.0)));
        assert_eq!(s.timer(Source::Weather).next_due_at(), 1000);
    }

    #[test]
    fn due_times_never_move_back_over_mixed_outcomes() {
        let mut s = Scheduler::with_intervals(0, [(1000, 50), (2000, 100), (3000, 150)]).unwrap();
        // Deterministic mix: roughly one success in three per source.
        let pattern = |i: usize, salt: usize| (i * 7 + salt) % 3 == 0;
        let mut f = Scripted {
            weather: (0..600)
                .map(|i| if pattern(i, 0) { Ok(weather(i as f32)) } else { Err(TIMEOUT) })
                .collect(),
            calendar: (0..600)
                .map(|i| if pattern(i, 1) { Ok(EventList::new()) } else { Err(TIMEOUT) })
                .collect(),
            aggregate: (0..600)
                .map(|i| {
                    if pattern(i, 2) {
                        Ok(AggregateSnapshot::default())
                    } else {
                        Err(FetchError::Payload(PayloadKind::Shape))
                    }
                })
                .collect(),
            ..Scripted::default()
        };

        let mut last = Source::PRIORITY.map(|src| s.timer(src).next_due_at());
        let mut now = 0;
        while now < 20_000 {
            block_on(s.tick(now, &mut f, |_, _| {}));
            for (slot, src) in Source::PRIORITY.into_iter().enumerate() {
                let due = s.timer(src).next_due_at();
                assert!(due > now, "{src:?} due {due} not after now {now}");
                assert!(due >= last[slot], "{src:?} moved back {} -> {due}", last[slot]);
                last[slot] = due;
            }
            now += 37;
        }
        assert!(f.calls.len() > 100);
    }

    #[test]
    fn tick_services_due_sources_in_priority_order() {
        let mut s = Scheduler::new(0).unwrap();
        let mut f = Scripted {
            weather: vec![Ok(weather(25.0))],
            calendar: vec![Ok(EventList::new())],
            aggregate: vec![Err(FetchError::Protocol(500))],
            ..Scripted::default()
        };
        let mut updates = std::vec::Vec::new();

        let n = block_on(s.tick(0, &mut f, |src, _| updates.push(src)));

        assert_eq!(n, 2);
        assert_eq!(f.calls, [Source::Weather, Source::Calendar, Source::Aggregate]);
        assert_eq!(updates, [Source::Weather, Source::Calendar]);
        assert_eq!(s.timer(Source::Aggregate).next_due_at(), AGGREGATE_RETRY_MS);
    }

    #[test]
    fn tick_skips_sources_not_yet_due() {
        let mut s = Scheduler::with_intervals(0, [(1000, 50), (5000, 100), (5000, 150)]).unwrap();
        let mut f = Scripted {
            weather: vec![Ok(weather(25.0)), Ok(weather(26.0))],
            calendar: vec![Ok(EventList::new())],
            aggregate: vec![Ok(AggregateSnapshot::default())],
            ..Scripted::default()
        };
        block_on(s.tick(0, &mut f, |_, _| {}));
        f.calls.clear();

        block_on(s.tick(999, &mut f, |_, _| {}));
        assert!(f.calls.is_empty());

        block_on(s.tick(1000, &mut f, |_, _| {}));
        assert_eq!(f.calls, [Source::Weather]);
        assert_eq!(s.data().weather.get(), Some(&weather(26.0)));
    }

    #[test]
    fn fresh_aggregate_is_published_once() {
        let mut s = Scheduler::new(0).unwrap();
        let agg = AggregateSnapshot {
            subscriber_count: 77,
            ..AggregateSnapshot::default()
        };
        let mut f = Scripted {
            weather: vec![Err(TIMEOUT), Err(TIMEOUT)],
            calendar: vec![Err(TIMEOUT), Err(TIMEOUT)],
            aggregate: vec![Ok(agg), Err(TIMEOUT)],
            ..Scripted::default()
        };
        block_on(s.tick(0, &mut f, |_, _| {}));
        assert_eq!(f.published, [77]);
        // Publish failure leaves the normal schedule in place.
        assert_eq!(s.timer(Source::Aggregate).next_due_at(), AGGREGATE_REFRESH_MS);

        block_on(s.tick(AGGREGATE_REFRESH_MS, &mut f, |_, _| {}));
        assert_eq!(f.published, [77]);
    }

    #[test]
    fn update_callback_sees_new_value() {
        let mut s = Scheduler::new(0).unwrap();
        let mut f = Scripted {
            weather: vec![Ok(weather(19.5))],
            calendar: vec![Err(TIMEOUT)],
            aggregate: vec![Err(TIMEOUT)],
            ..Scripted::default()
        };
        let mut seen = None;
        block_on(s.tick(0, &mut f, |_, data| {
            seen = data.weather.get().map(|w| w.temperature);
        }));
        assert_eq!(seen, Some(19.5));
    }
}
