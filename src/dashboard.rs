//! Dashboard driver - one [`Dashboard::tick`] per main-loop iteration.
//!
//! Order within a tick:
//!
//! 1. sample the button; a release switches screen and renders it
//! 2. re-render on link state change, or on a new second while on Clock
//! 3. while online, service due sources in priority order, rendering right
//!    after any update that backs the visible screen

use crate::api::Fetcher;
use crate::data::DashboardData;
use crate::error::Error;
use crate::scheduler::{Scheduler, Source};
use crate::ui::debounce::Debouncer;
use crate::ui::screen::ScreenSelector;
use crate::ui::view::{Frame, View};
use crate::ui::{Level, ScreenId};

/// Pixel sink. Must not block for long; it runs inside the loop.
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Inputs sampled once at the top of a loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInput {
    /// Monotonic milliseconds.
    pub now_ms: u64,
    pub button: Level,
    /// UTC epoch seconds, `None` before the first time sync.
    pub wall_clock: Option<i64>,
    /// Network link is up.
    pub online: bool,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    pub screen_changed: bool,
    pub sources_updated: usize,
    pub renders: usize,
}

pub struct Dashboard {
    scheduler: Scheduler,
    debouncer: Debouncer,
    selector: ScreenSelector,
    online: bool,
    shown_second: Option<i64>,
}

impl Dashboard {
    /// Configured intervals and thresholds; every source due at `now_ms`.
    pub fn new(now_ms: u64) -> Result<Self, Error> {
        Ok(Self::from_parts(
            Scheduler::new(now_ms)?,
            Debouncer::default(),
            ScreenSelector::default(),
        ))
    }

    pub fn from_parts(scheduler: Scheduler, debouncer: Debouncer, selector: ScreenSelector) -> Self {
        Self {
            scheduler,
            debouncer,
            selector,
            online: false,
            shown_second: None,
        }
    }

    pub fn screen(&self) -> ScreenId {
        self.selector.current()
    }

    pub fn data(&self) -> &DashboardData {
        self.scheduler.data()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Draw the initial screen.
    pub fn start<R: Renderer>(&mut self, renderer: &mut R, wall_clock: Option<i64>, online: bool) {
        self.online = online;
        self.redraw(renderer, wall_clock);
    }

    pub async fn tick<F, R>(&mut self, input: TickInput, fetcher: &mut F, renderer: &mut R) -> TickReport
    where
        F: Fetcher,
        R: Renderer,
    {
        let mut report = TickReport::default();

        if let Some(release) = self.debouncer.sample(input.button, input.now_ms) {
            self.selector.on_release(release);
            report.screen_changed = true;
        }

        let link_changed = input.online != self.online;
        if link_changed {
            info!("link {}", if input.online { "up" } else { "down" });
            self.online = input.online;
        }

        let clock_moved =
            self.selector.current() == ScreenId::Clock && input.wall_clock != self.shown_second;

        if report.screen_changed || link_changed || clock_moved {
            self.redraw(renderer, input.wall_clock);
            report.renders += 1;
        }

        if !self.online {
            return report;
        }

        let screen = self.selector.current();
        let online = self.online;
        let wall_clock = input.wall_clock;
        let mut renders = 0;
        report.sources_updated = self
            .scheduler
            .tick(input.now_ms, fetcher, |source: Source, data: &DashboardData| {
                if source.backs(screen) {
                    renderer.render(&Frame {
                        view: View::build(screen, data, wall_clock),
                        online,
                    });
                    renders += 1;
                }
            })
            .await;
        report.renders += renders;

        report
    }

    fn redraw<R: Renderer>(&mut self, renderer: &mut R, wall_clock: Option<i64>) {
        let screen = self.selector.current();
        if screen == ScreenId::Clock {
            self.shown_second = wall_clock;
        }
        renderer.render(&Frame {
            view: View::build(screen, self.scheduler.data(), wall_clock),
            online: self.online,
        });
    }
}
