//! infodash - single-button OLED information dashboard.
//!
//! Everything that decides *what* is shown lives in this library and builds
//! on the host: refresh scheduling, payload decoding, button debouncing,
//! screen navigation and the per-screen text model.
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! The `embedded` feature adds the ESP32-C6 pieces (Wi-Fi, SNTP, HTTP
//! fetcher, SSD1306 renderer, GPIO button) that `main.rs` wires together.

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

extern crate alloc;

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

pub mod api;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod scheduler;
pub mod ui;

#[cfg(feature = "embedded")]
pub mod net;

pub use dashboard::{Dashboard, Renderer, TickInput, TickReport};
pub use error::{Error, FetchError};
