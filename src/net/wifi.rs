//! Station-mode Wi-Fi supervisor.
//!
//! Keeps the controller associated for the life of the firmware: connect,
//! wait for a disconnect event, pause, connect again. Reachability is read
//! straight from the stack by the main loop (see [`super::is_online`]).

use embassy_time::{with_timeout, Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiEvent};

use crate::config::{WIFI_CONNECT_TIMEOUT_MS, WIFI_PASS, WIFI_RETRY_MS, WIFI_SSID};

#[embassy_executor::task]
pub async fn wifi_task(mut controller: WifiController<'static>) -> ! {
    if WIFI_SSID.is_empty() {
        warn!("WIFI_SSID not set at build time; staying offline");
    }

    loop {
        if matches!(controller.is_connected(), Ok(true)) {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("wifi: disconnected");
            Timer::after(Duration::from_millis(WIFI_RETRY_MS)).await;
            continue;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let mode = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASS.into()),
            );
            if let Err(e) = controller.set_config(&mode) {
                error!("wifi: config rejected: {}", e);
                Timer::after(Duration::from_millis(WIFI_RETRY_MS)).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                error!("wifi: start failed: {}", e);
                Timer::after(Duration::from_millis(WIFI_RETRY_MS)).await;
                continue;
            }
            info!("wifi: started");
        }

        info!("wifi: connecting to {}", WIFI_SSID);
        let budget = Duration::from_millis(WIFI_CONNECT_TIMEOUT_MS);
        match with_timeout(budget, controller.connect_async()).await {
            Ok(Ok(())) => info!("wifi: associated"),
            Ok(Err(e)) => {
                warn!("wifi: connect failed: {}", e);
                Timer::after(Duration::from_millis(WIFI_RETRY_MS)).await;
            }
            Err(_) => {
                warn!("wifi: connect timed out");
                Timer::after(Duration::from_millis(WIFI_RETRY_MS)).await;
            }
        }
    }
}
