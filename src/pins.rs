//! GPIO / peripheral pin assignments for the ThermoGuard board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relay outputs (opto-isolated relay module)
// ---------------------------------------------------------------------------

/// Heating relay coil driver.
pub const HEATING_RELAY_GPIO: i32 = 5;
/// Cooling relay coil driver.
pub const COOLING_RELAY_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// I²C bus (MLX90614 IR thermometer)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 4;
pub const I2C_SCL_GPIO: i32 = 8;
/// SMBus devices are limited to 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;
