//! Network side of the firmware: Wi-Fi link, SNTP time sync and the HTTP
//! fetcher the scheduler drives.

pub mod http;
pub mod ntp;
pub mod wifi;

use core::cell::Cell;

use embassy_net::{Runner, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use esp_radio::wifi::WifiDevice;

use crate::clock::WallClock;

/// Shared between the SNTP task (writer) and the main loop (reader).
pub static WALL_CLOCK: Mutex<CriticalSectionRawMutex, Cell<WallClock>> =
    Mutex::new(Cell::new(WallClock::unsynced()));

/// UTC epoch seconds at monotonic `now_ms`, once SNTP has answered.
pub fn wall_clock_now(now_ms: u64) -> Option<i64> {
    WALL_CLOCK.lock(|clock| clock.get().now(now_ms))
}

/// Associated and holding a DHCP lease.
pub fn is_online(stack: Stack<'_>) -> bool {
    stack.is_link_up() && stack.config_v4().is_some()
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
