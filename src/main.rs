//! LaserChase Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink        Esp32TimeAdapter   │
//! │  (Actuator + Input)     (EventSink)         (Clock)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            BehaviorArbiter (pure logic)                │    │
//! │  │  Scheduler · Markov speed chain · Gaussian sampler     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use laserchase::adapters::hardware::HardwareAdapter;
use laserchase::adapters::log_sink::LogEventSink;
use laserchase::app::arbiter::{BehaviorArbiter, rng_from_config};
use laserchase::app::ports::Clock;
use laserchase::config::SystemConfig;
use laserchase::error::Error;
use laserchase::drivers::hw_init;
use laserchase::drivers::pin::HwDelay;
use laserchase::motion::markov::default_speed_chain;

/// Boot blinks on the switch LED.
const BOOT_HEARTBEATS: u8 = 3;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LaserChase v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    // ── 3. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().context("invalid configuration")?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config dump failed: {}", e),
    }

    // ── 4. Behaviour core ─────────────────────────────────────
    let chain = default_speed_chain().context("speed chain")?;
    let rng = rng_from_config(&config);
    let mut arbiter = BehaviorArbiter::new(config.clone(), chain, rng)?;

    // ── 5. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::from_config(&config);
    let mut log_sink = LogEventSink::new();

    hw.switch_mut().heart_beat(BOOT_HEARTBEATS, &mut HwDelay);

    let now = hw.clock().now_ms();
    arbiter.start(now, &mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now = hw.clock().now_ms();
        arbiter.tick(now, &mut hw, &mut log_sink);

        esp_idf_svc::hal::delay::FreeRtos::delay_ms(config.loop_period_ms);
    }
}
