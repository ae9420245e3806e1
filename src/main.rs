//! ThermoGuard Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter     LogNotificationSink   NvsAdapter        │
//! │  (Sensor+Actuator)   (NotificationSink)    (StoragePort)     │
//! │  ConsoleChannel      MonotonicClock                          │
//! │  (RemoteChannel)     (Clock)                                 │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            ThermalService (pure logic)                 │  │
//! │  │  Aggregators · ProtectionController · CommandProcessor │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use thermoguard::adapters::console::{self, ConsoleChannel};
use thermoguard::adapters::hardware::HardwareAdapter;
use thermoguard::adapters::log_sink::LogNotificationSink;
use thermoguard::adapters::nvs::NvsAdapter;
use thermoguard::adapters::time::MonotonicClock;
use thermoguard::app::ports::Clock;
use thermoguard::app::service::ThermalService;
use thermoguard::config::SystemConfig;
use thermoguard::drivers::hw_init::{self, HwInitError};
use thermoguard::drivers::relay::RelayDriver;
use thermoguard::drivers::watchdog::Watchdog;
use thermoguard::error::Error;
use thermoguard::pins;
use thermoguard::remote::channels::InboundQueue;
use thermoguard::sensors::mlx90614::Mlx90614;

/// Control-loop pass period.  Every cadence is derived from the clock,
/// so this only bounds command latency.
const LOOP_PERIOD_MS: u64 = 50;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ThermoGuard v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::from_build_env()
        .map_err(Error::from)
        .unwrap_or_else(|e| {
            warn!("Build config rejected ({}), using defaults", e);
            SystemConfig::default()
        });

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals(config.relay_active_low) {
        error!("HAL init failed: {}", e);
        return Err(Error::from(e).into());
    }
    let watchdog = Watchdog::new();

    let peripherals = Peripherals::take()?;
    // SAFETY: the I²C pins are not claimed anywhere else.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_cfg).map_err(|e| {
        error!("I2C init failed: {}", e);
        Error::from(HwInitError::I2cInitFailed(e.code()))
    })?;

    let mut hw = HardwareAdapter::new(
        Mlx90614::new(i2c),
        RelayDriver::new(config.relay_active_low),
    );

    // ── 4. Storage ────────────────────────────────────────────
    let nvs = NvsAdapter::new().unwrap_or_else(|e| {
        warn!("NVS init failed ({}), running with defaults and no persistence", e);
        NvsAdapter::unavailable()
    });

    // ── 5. Remote channel ─────────────────────────────────────
    let queue = Arc::new(InboundQueue::new());
    if let Err(e) = console::spawn_reader(Arc::clone(&queue)) {
        warn!("Console reader not started ({}); commands disabled", e);
    }
    let mut channel = ConsoleChannel::new(queue);
    let mut sink = LogNotificationSink::new();
    let clock = MonotonicClock::new();

    // ── 6. Service ────────────────────────────────────────────
    let mut service = ThermalService::new(&config, nvs);
    service.boot(clock.now_ms(), &mut hw);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        service.tick(clock.now_ms(), &mut hw, &mut sink, &mut channel);
        watchdog.feed();
        std::thread::sleep(Duration::from_millis(LOOP_PERIOD_MS));
    }
}
