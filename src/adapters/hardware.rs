//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the thermometer and the relay driver and exposes them through
//! [`SensorPort`] and [`ActuatorPort`].  On non-espidf targets the relay
//! driver runs its cfg-gated simulation stubs.

use log::debug;

use crate::app::ports::{ActuatorPort, RelayChannel, SensorPort, TemperatureReading};
use crate::drivers::relay::RelayDriver;
use crate::error::SensorError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S> {
    sensor: S,
    relays: RelayDriver,
}

impl<S: SensorPort> HardwareAdapter<S> {
    pub fn new(sensor: S, relays: RelayDriver) -> Self {
        Self { sensor, relays }
    }

    pub fn relays(&self) -> &RelayDriver {
        &self.relays
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: SensorPort> SensorPort for HardwareAdapter<S> {
    fn read(&mut self) -> Result<TemperatureReading, SensorError> {
        self.sensor.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S: SensorPort> ActuatorPort for HardwareAdapter<S> {
    fn write_relay(&mut self, channel: RelayChannel, energized: bool) {
        debug!("relay {:?} -> {}", channel, if energized { "on" } else { "off" });
        self.relays.set(channel, energized);
    }
}
