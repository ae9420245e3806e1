//! Heating / cooling relay driver.
//!
//! Two digital outputs behind an opto-isolated relay module.  Most such
//! modules energise the coil when the input is pulled low, so the logic
//! level is derived from the configured polarity.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIOs via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::app::ports::RelayChannel;
use crate::drivers::hw_init;
use crate::pins;

pub struct RelayDriver {
    active_low: bool,
    heating_on: bool,
    cooling_on: bool,
}

impl RelayDriver {
    pub fn new(active_low: bool) -> Self {
        Self {
            active_low,
            heating_on: false,
            cooling_on: false,
        }
    }

    pub fn set(&mut self, channel: RelayChannel, energized: bool) {
        let pin = match channel {
            RelayChannel::Heating => {
                self.heating_on = energized;
                pins::HEATING_RELAY_GPIO
            }
            RelayChannel::Cooling => {
                self.cooling_on = energized;
                pins::COOLING_RELAY_GPIO
            }
        };
        hw_init::gpio_write(pin, self.level_for(energized));
    }

    /// GPIO level that puts the coil into the requested state.
    pub fn level_for(&self, energized: bool) -> bool {
        energized != self.active_low
    }

    pub fn is_on(&self, channel: RelayChannel) -> bool {
        match channel {
            RelayChannel::Heating => self.heating_on,
            RelayChannel::Cooling => self.cooling_on,
        }
    }
}
