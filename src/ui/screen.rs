//! Circular screen selector.

use crate::config::LONG_PRESS_MS;
use crate::ui::input_logic::{select_next, select_prev};
use crate::ui::{PressKind, ReleaseEvent, ScreenId};

/// Owns the current screen. Starts on [`ScreenId::Clock`].
#[derive(Clone, Debug)]
pub struct ScreenSelector {
    current: ScreenId,
    long_press_ms: u64,
}

impl Default for ScreenSelector {
    fn default() -> Self {
        Self::new(LONG_PRESS_MS)
    }
}

impl ScreenSelector {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            current: ScreenId::ALL[0],
            long_press_ms,
        }
    }

    pub fn current(&self) -> ScreenId {
        self.current
    }

    /// Short press moves forward, long press moves back; both wrap.
    /// The caller must re-render the returned screen unconditionally.
    pub fn on_release(&mut self, event: ReleaseEvent) -> ScreenId {
        let count = ScreenId::ALL.len();
        let index = self.current.index();
        let next = match event.kind(self.long_press_ms) {
            PressKind::Short => select_next(index, count),
            PressKind::Long => select_prev(index, count),
        };
        self.current = ScreenId::from_index(next);
        info!("screen -> {}", self.current);
        self.current
    }
}
