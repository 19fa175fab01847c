//! Button debouncer.
//!
//! Raw pin samples go in, at most one [`ReleaseEvent`] per press comes out.
//!
//! ```text
//!            raw != stable                 raw == candidate && now - since > window
//! Stable ─────────────────> Debouncing ───────────────────────────────────────────> Stable'
//!   ^                           │
//!   └───────────────────────────┘ raw back to stable level (bounce)
//! ```
//!
//! Pressed→released acceptance emits `held = now - press_started_at`.
//! Released→pressed acceptance only records `press_started_at`.

use crate::config::{BUTTON_ACTIVE_LOW, BUTTON_DEBOUNCE_MS};
use crate::ui::{Level, ReleaseEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// Accepted level, no pending change.
    Stable { pressed: bool },
    /// Raw level differs from the accepted one since `since`.
    Debouncing {
        stable: bool,
        candidate: bool,
        since: u64,
    },
}

#[derive(Clone, Debug)]
pub struct Debouncer {
    state: DebounceState,
    active_low: bool,
    window_ms: u64,
    press_started_at: u64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(BUTTON_ACTIVE_LOW, BUTTON_DEBOUNCE_MS)
    }
}

impl Debouncer {
    /// Starts released.
    pub fn new(active_low: bool, window_ms: u64) -> Self {
        Self {
            state: DebounceState::Stable { pressed: false },
            active_low,
            window_ms,
            press_started_at: 0,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Debounced pressed/released.
    pub fn is_pressed(&self) -> bool {
        match self.state {
            DebounceState::Stable { pressed } => pressed,
            DebounceState::Debouncing { stable, .. } => stable,
        }
    }

    fn is_active(&self, level: Level) -> bool {
        match level {
            Level::Low => self.active_low,
            Level::High => !self.active_low,
        }
    }

    /// Feed one raw sample taken at `now` (monotonic ms).
    pub fn sample(&mut self, level: Level, now: u64) -> Option<ReleaseEvent> {
        let raw = self.is_active(level);

        match self.state {
            DebounceState::Stable { pressed } => {
                if raw != pressed {
                    self.state = DebounceState::Debouncing {
                        stable: pressed,
                        candidate: raw,
                        since: now,
                    };
                }
                None
            }
            DebounceState::Debouncing { stable, candidate, since } => {
                if raw != candidate {
                    // Bounced back before the window elapsed.
                    self.state = DebounceState::Stable { pressed: stable };
                    return None;
                }
                if now.saturating_sub(since) <= self.window_ms {
                    return None;
                }

                self.state = DebounceState::Stable { pressed: candidate };
                if candidate {
                    self.press_started_at = now;
                    trace!("button pressed at {}", now);
                    None
                } else {
                    let held_ms = now.saturating_sub(self.press_started_at);
                    debug!("button released after {} ms", held_ms);
                    Some(ReleaseEvent { held_ms })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive `level` every millisecond over `from..=to`, collecting events.
    fn hold(d: &mut Debouncer, level: Level, from: u64, to: u64) -> std::vec::Vec<ReleaseEvent> {
        (from..=to).filter_map(|t| d.sample(level, t)).collect()
    }

    #[test]
    fn idle_high_is_released_for_active_low() {
        let mut d = Debouncer::new(true, 35);
        assert!(hold(&mut d, Level::High, 0, 100).is_empty());
        assert!(!d.is_pressed());
        assert_eq!(d.state(), DebounceState::Stable { pressed: false });
    }

    #[test]
    fn glitch_shorter_than_window_is_ignored() {
        let mut d = Debouncer::new(true, 35);
        assert!(hold(&mut d, Level::Low, 0, 35).is_empty());
        assert!(hold(&mut d, Level::High, 36, 200).is_empty());
        assert!(!d.is_pressed());
    }

    #[test]
    fn window_comparison_is_strict() {
        let mut d = Debouncer::new(true, 35);
        assert_eq!(d.sample(Level::Low, 100), None);
        assert_eq!(d.sample(Level::Low, 135), None);
        assert!(!d.is_pressed());
        assert_eq!(d.sample(Level::Low, 136), None);
        assert!(d.is_pressed());
    }

    #[test]
    fn release_reports_held_duration() {
        let mut d = Debouncer::new(true, 35);
        hold(&mut d, Level::Low, 0, 36);
        assert!(d.is_pressed());

        // Release accepted at 272, press was accepted at 36.
        let events = hold(&mut d, Level::High, 236, 300);
        assert_eq!(events, [ReleaseEvent { held_ms: 236 }]);
    }

    #[test]
    fn bounce_during_press_restarts_window() {
        let mut d = Debouncer::new(true, 35);
        d.sample(Level::Low, 0);
        d.sample(Level::High, 20);
        d.sample(Level::Low, 30);
        assert_eq!(d.sample(Level::Low, 60), None);
        assert!(!d.is_pressed());
        d.sample(Level::Low, 66);
        assert!(d.is_pressed());
    }

    #[test]
    fn active_high_polarity() {
        let mut d = Debouncer::new(false, 35);
        assert!(hold(&mut d, Level::Low, 0, 100).is_empty());
        assert!(!d.is_pressed());
        hold(&mut d, Level::High, 101, 200);
        assert!(d.is_pressed());
        let events = hold(&mut d, Level::Low, 201, 300);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn one_event_per_press() {
        let mut d = Debouncer::default();
        let mut events = std::vec::Vec::new();
        for press in 0..3u64 {
            let base = press * 1_000;
            events.extend(hold(&mut d, Level::Low, base, base + 100));
            events.extend(hold(&mut d, Level::High, base + 101, base + 999));
        }
        assert_eq!(events.len(), 3);
    }
}
