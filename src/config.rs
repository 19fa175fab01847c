//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, refresh intervals and
//! endpoint settings live here so they can be tuned in one place.
//! Secrets are read from the build environment (see `build.rs`).

// Display

/// OLED panel geometry (SSD1306/SH1106 class, 128×64).
pub const SCREEN_WIDTH: u32 = 128;

/// 7-bit I²C address of the OLED controller.
pub const OLED_I2C_ADDR: u8 = 0x3C;

/// I²C bus clock (kHz).
pub const I2C_FREQ_KHZ: u32 = 400;

// GPIO pin assignments (ESP32-C6 DevKit defaults)
//
// These are logical names; actual `esp_hal::peripherals::*` pins are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button         → GPIO4  (to GND, internal pull-up)
//   I²C SDA        → GPIO6
//   I²C SCL        → GPIO7

/// Button pulls the pin low when pressed.
pub const BUTTON_ACTIVE_LOW: bool = true;

/// Button debounce window (ms). A raw level must hold longer than this.
pub const BUTTON_DEBOUNCE_MS: u64 = 35;

/// Releases held at least this long move to the previous screen (ms).
pub const LONG_PRESS_MS: u64 = 500;

// Main loop

/// Idle wait between loop ticks (ms). Short enough to sample the button
/// several times inside one debounce window.
pub const LOOP_IDLE_MS: u64 = 5;

// Refresh intervals (ms). Each retry interval must stay below its normal one.

pub const WEATHER_REFRESH_MS: u64 = 15 * 60 * 1000;
pub const WEATHER_RETRY_MS: u64 = 5_000;

pub const CALENDAR_REFRESH_MS: u64 = 10 * 60 * 1000;
pub const CALENDAR_RETRY_MS: u64 = 10_000;

pub const AGGREGATE_REFRESH_MS: u64 = 5 * 60 * 1000;
pub const AGGREGATE_RETRY_MS: u64 = 15_000;

const _: () = assert!(WEATHER_RETRY_MS < WEATHER_REFRESH_MS);
const _: () = assert!(CALENDAR_RETRY_MS < CALENDAR_REFRESH_MS);
const _: () = assert!(AGGREGATE_RETRY_MS < AGGREGATE_REFRESH_MS);

// Network

/// Whole-request budget for one HTTP fetch (connect + headers + body).
pub const HTTP_TIMEOUT_MS: u64 = 8_000;

/// Largest response body we accept (bytes).
pub const HTTP_BODY_MAX: usize = 12 * 1024;

/// Wi-Fi association attempt budget and the pause between attempts.
pub const WIFI_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const WIFI_RETRY_MS: u64 = 5_000;

/// NTP servers, tried in order.
pub const NTP_SERVERS: [&str; 2] = ["pool.ntp.org", "time.google.com"];
pub const NTP_TIMEOUT_MS: u64 = 5_000;
pub const NTP_RESYNC_SECS: u64 = 6 * 60 * 60;
/// Pause before retrying after every server failed.
pub const NTP_RETRY_SECS: u64 = 60;

// Content

/// Maximum calendar events requested and retained.
pub const MAX_EVENTS: usize = 5;

/// Events listed on the Events screen.
pub const EVENTS_ON_SCREEN: usize = 3;

/// Headlines carried by the aggregate endpoint.
pub const HEADLINE_COUNT: usize = 3;

/// Visible characters per text-size-1 line (6 px font on 128 px).
pub const LINE_CHARS: usize = 21;

/// Event titles are cut to this many characters.
pub const EVENT_TITLE_CHARS: usize = 12;

/// Local time offset from UTC used for the clock and event times (Asia/Ho_Chi_Minh).
pub const UTC_OFFSET_SECS: i32 = 7 * 3600;

// OpenWeatherMap query

pub const OWM_LAT: &str = "10.7769";
pub const OWM_LON: &str = "106.7009";
/// "metric" or "imperial".
pub const OWM_UNITS: &str = "metric";
/// Descriptions are drawn with an ASCII font, so ask for English.
pub const OWM_LANG: &str = "en";
pub const OWM_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

// Secrets (build environment)

const fn env_or_empty(value: Option<&'static str>) -> &'static str {
    match value {
        Some(v) => v,
        None => "",
    }
}

pub const WIFI_SSID: &str = env_or_empty(option_env!("WIFI_SSID"));
pub const WIFI_PASS: &str = env_or_empty(option_env!("WIFI_PASS"));
pub const OWM_API_KEY: &str = env_or_empty(option_env!("OWM_API_KEY"));
pub const GCAL_JSON_URL: &str = env_or_empty(option_env!("GCAL_JSON_URL"));
pub const AGGREGATE_URL: &str = env_or_empty(option_env!("AGGREGATE_URL"));

/// ThingSpeak channel write key; publishing is skipped when unset.
pub const THINGSPEAK_WRITE_KEY: Option<&str> = option_env!("THINGSPEAK_WRITE_KEY");
pub const THINGSPEAK_BASE_URL: &str = "http://api.thingspeak.com/update";
