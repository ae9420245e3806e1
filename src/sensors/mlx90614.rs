//! Melexis MLX90614 infrared thermometer (SMBus / I²C).
//!
//! Two RAM registers are read per sample: `Ta` (die / ambient) and
//! `Tobj1` (target object).  Each read returns three bytes, a 16-bit
//! little-endian value followed by a PEC byte:
//!
//! ```text
//!   raw[15]    error flag (reading invalid)
//!   raw[14:0]  temperature in units of 0.02 K
//! ```
//!
//! The driver is generic over [`embedded_hal::i2c::I2c`], so it runs on
//! the ESP-IDF I²C driver on the board and on a mock bus in tests.

use embedded_hal::i2c::I2c;

use crate::app::ports::{SensorPort, TemperatureReading};
use crate::error::SensorError;

/// Factory-default SMBus address.
pub const DEFAULT_ADDRESS: u8 = 0x5A;

/// RAM register: ambient (die) temperature.
pub const REG_TA: u8 = 0x06;
/// RAM register: object temperature, zone 1.
pub const REG_TOBJ1: u8 = 0x07;

const KELVIN_PER_LSB: f32 = 0.02;
const KELVIN_OFFSET: f32 = 273.15;
const ERROR_FLAG: u16 = 0x8000;

pub struct Mlx90614<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mlx90614<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Ambient temperature in °C.
    pub fn ambient_c(&mut self) -> Result<f32, SensorError> {
        self.read_register(REG_TA).and_then(raw_to_celsius)
    }

    /// Object temperature in °C.
    pub fn object_c(&mut self) -> Result<f32, SensorError> {
        self.read_register(REG_TOBJ1).and_then(raw_to_celsius)
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| {
                log::debug!("mlx90614: reg 0x{:02X} read failed: {:?}", reg, e);
                SensorError::BusError
            })?;
        Ok(u16::from_le_bytes([buf[0], buf[1]]))
    }
}

impl<I2C: I2c> SensorPort for Mlx90614<I2C> {
    fn read(&mut self) -> Result<TemperatureReading, SensorError> {
        let ambient_c = self.ambient_c()?;
        let object_c = self.object_c()?;
        Ok(TemperatureReading {
            ambient_c,
            object_c,
        })
    }
}

/// Convert a raw register value to °C, rejecting flagged readings.
pub fn raw_to_celsius(raw: u16) -> Result<f32, SensorError> {
    if raw & ERROR_FLAG != 0 {
        return Err(SensorError::OutOfRange);
    }
    Ok(f32::from(raw) * KELVIN_PER_LSB - KELVIN_OFFSET)
}
