//! User interface subsystem - OLED display + one physical button.
//!
//! A single tactile switch cycles through the screens: a short press moves
//! forward, a long press moves back. Screens re-render when switched to and
//! when a refresh lands on the visible one.
//!
//! ## Components
//!
//! - **Debounce**: raw level samples to release events with held time
//! - **Screen**: circular selector over [`ScreenId`]
//! - **View**: per-screen render model built from the cache
//! - **Display**: SH1106/SSD1306 128×64 OLED via I²C (embedded only)
//! - **Buttons**: GPIO sampling (embedded only)

pub mod debounce;
pub mod input_logic;
pub mod screen;
pub mod view;

#[cfg(feature = "embedded")]
pub mod buttons;
#[cfg(feature = "embedded")]
pub mod display;

/// Screens the dashboard can show, in navigation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    /// Local time and date.
    Clock,
    /// Current conditions.
    Weather,
    /// Next calendar events.
    Events,
    /// Subscriber count.
    Social,
    /// BTC/ETH prices.
    Crypto,
    /// Headlines.
    News,
}

impl ScreenId {
    pub const ALL: [ScreenId; 6] = [
        ScreenId::Clock,
        ScreenId::Weather,
        ScreenId::Events,
        ScreenId::Social,
        ScreenId::Crypto,
        ScreenId::News,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Screen at `index`, wrapping past the end.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Header text.
    pub fn title(self) -> &'static str {
        match self {
            ScreenId::Clock => "Clock",
            ScreenId::Weather => "Weather",
            ScreenId::Events => "Events",
            ScreenId::Social => "YouTube",
            ScreenId::Crypto => "Crypto",
            ScreenId::News => "News",
        }
    }
}

/// Raw electrical level of the button pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Debounced press-then-release, carrying how long the button was held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReleaseEvent {
    pub held_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
}

impl ReleaseEvent {
    /// `held >= threshold` is a long press.
    pub fn kind(self, long_press_ms: u64) -> PressKind {
        if self.held_ms >= long_press_ms {
            PressKind::Long
        } else {
            PressKind::Short
        }
    }
}
