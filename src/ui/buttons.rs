//! GPIO button sampling.
//!
//! The pin is only read here; debouncing and press classification happen in
//! [`super::debounce`] so they stay host-testable. The main loop samples
//! once per tick, which is several times inside one debounce window.

use esp_hal::gpio::{Input, InputConfig, InputPin, Pull};

use crate::ui::Level;

pub struct Button<'d> {
    input: Input<'d>,
}

impl<'d> Button<'d> {
    /// Button wired to ground, read through the internal pull-up.
    pub fn new(pin: impl InputPin + 'd) -> Self {
        Self {
            input: Input::new(pin, InputConfig::default().with_pull(Pull::Up)),
        }
    }

    pub fn level(&self) -> Level {
        if self.input.is_high() {
            Level::High
        } else {
            Level::Low
        }
    }
}
