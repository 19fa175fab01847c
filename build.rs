//! Build script - passes the esp-hal linker script to the firmware binary
//! so that host builds of the library and its tests stay untouched.

use std::env;

fn main() {
    // Only bare-metal targets need the esp-hal/esp-rtos memory layout.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Secrets are baked in at compile time via env!/option_env!.
    for var in [
        "WIFI_SSID",
        "WIFI_PASS",
        "OWM_API_KEY",
        "GCAL_JSON_URL",
        "AGGREGATE_URL",
        "THINGSPEAK_WRITE_KEY",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
