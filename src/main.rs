//! infodash firmware - ESP32-C6 + 128x64 I²C OLED + one button.
//!
//! Build-time environment:
//!   - WIFI_SSID / WIFI_PASS: station credentials
//!   - OWM_API_KEY: OpenWeatherMap key
//!   - GCAL_JSON_URL: calendar feed returning a JSON array of events
//!   - AGGREGATE_URL: social / crypto / news endpoint
//!   - THINGSPEAK_WRITE_KEY: optional, enables publishing
//!
//! Wiring (see `config.rs`): button GPIO4 to GND, SDA GPIO6, SCL GPIO7.

#![no_std]
#![no_main]

use defmt::{debug, error, info};
use defmt_rtt as _;
use esp_alloc as _;
use esp_backtrace as _;

use embassy_executor::Spawner;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::StackResources;
use embassy_time::{Duration, Instant, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::Controller;

use infodash::config::{HTTP_BODY_MAX, I2C_FREQ_KHZ, LOOP_IDLE_MS};
use infodash::net::http::{HttpFetcher, TCP_BUF_SIZE, TLS_BUF_SIZE};
use infodash::net::{self, ntp::ntp_task, wifi::wifi_task};
use infodash::ui::buttons::Button;
use infodash::ui::display::Oled;
use infodash::{Dashboard, TickInput};

esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry Point
// ═══════════════════════════════════════════════════════════════════════════

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    info!("infodash starting");

    // ── Display ──────────────────────────────────────────────────────────
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ));
    let i2c = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => i2c.with_sda(peripherals.GPIO6).with_scl(peripherals.GPIO7),
        Err(_) => halt("i2c config rejected").await,
    };
    let mut oled = match Oled::new(i2c) {
        Ok(oled) => oled,
        Err(e) => {
            error!("display init failed: {}", e);
            halt("no display").await
        }
    };

    let button = Button::new(peripherals.GPIO4);

    // ── Wi-Fi + network stack ────────────────────────────────────────────
    let radio = match esp_radio::init() {
        Ok(radio) => &*mk_static!(Controller<'static>, radio),
        Err(_) => halt("radio init failed").await,
    };
    let (controller, interfaces) =
        match esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()) {
            Ok(parts) => parts,
            Err(_) => halt("wifi init failed").await,
        };

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    // DHCP, DNS, one TCP client and the SNTP UDP socket.
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<4>, StackResources::<4>::new()),
        seed,
    );

    if spawner.spawn(net::net_task(runner)).is_err() {
        halt("net task spawn failed").await;
    }
    if spawner.spawn(wifi_task(controller)).is_err() {
        halt("wifi task spawn failed").await;
    }
    if spawner.spawn(ntp_task(stack)).is_err() {
        error!("ntp task spawn failed; clock will stay unsynced");
    }

    // ── HTTP fetcher ─────────────────────────────────────────────────────
    let tcp_state = mk_static!(
        TcpClientState<1, TCP_BUF_SIZE, TCP_BUF_SIZE>,
        TcpClientState::new()
    );
    let tcp = TcpClient::new(stack, tcp_state);
    let dns = DnsSocket::new(stack);
    let tls_read = mk_static!([u8; TLS_BUF_SIZE], [0; TLS_BUF_SIZE]);
    let tls_write = mk_static!([u8; TLS_BUF_SIZE], [0; TLS_BUF_SIZE]);
    let rx = mk_static!([u8; HTTP_BODY_MAX], [0; HTTP_BODY_MAX]);
    let mut fetcher = HttpFetcher::new(&tcp, &dns, tls_read, tls_write, rx, seed);

    // ── Main loop ────────────────────────────────────────────────────────
    let mut dashboard = match Dashboard::new(Instant::now().as_millis()) {
        Ok(d) => d,
        Err(e) => {
            error!("scheduler config: {}", e);
            halt("bad refresh intervals").await
        }
    };
    dashboard.start(&mut oled, None, false);

    loop {
        let now_ms = Instant::now().as_millis();
        let input = TickInput {
            now_ms,
            button: button.level(),
            wall_clock: net::wall_clock_now(now_ms),
            online: net::is_online(stack),
        };

        let report = dashboard.tick(input, &mut fetcher, &mut oled).await;
        if report.sources_updated > 0 || report.screen_changed {
            debug!("tick: {}", report);
        }

        Timer::after(Duration::from_millis(LOOP_IDLE_MS)).await;
    }
}

/// Log and park forever; nothing useful can run without the failed part.
async fn halt(reason: &str) -> ! {
    error!("halted: {}", reason);
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
