//! PCA9534 8-bit I²C I/O expander.
//!
//! ## Register map
//!
//! | Reg  | Name          | Reset | Notes                                  |
//! |------|---------------|-------|----------------------------------------|
//! | 0x00 | Input port    | -     | Live pin levels, outputs included      |
//! | 0x01 | Output port   | 0xFF  | Driven level of output-configured pins |
//! | 0x02 | Polarity inv. | 0x00  | Unused                                 |
//! | 0x03 | Configuration | 0xFF  | 1 = input, 0 = output                  |
//!
//! Any `embedded-hal` 1.0 I²C master becomes an [`ExpanderBus`] through
//! [`I2cExpanderBus`]; the cached port logic lives in
//! [`DigitalPort`](super::port::DigitalPort).

use embedded_hal::i2c::I2c;

use crate::app::ports::ExpanderBus;

/// Register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Input = 0x00,
    Output = 0x01,
    PolarityInversion = 0x02,
    Configuration = 0x03,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Power-on configuration: every line is an input.
pub const RESET_CONFIGURATION: u8 = 0xFF;

/// [`ExpanderBus`] over an `embedded-hal` I²C master.
///
/// All expanders share one bus, so the adapter owns the master and
/// takes the device address per call.
pub struct I2cExpanderBus<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> I2cExpanderBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> ExpanderBus for I2cExpanderBus<I2C> {
    type Error = I2C::Error;

    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(address, &[register, value])
    }

    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(address, &[register], &mut buf)?;
        Ok(buf[0])
    }
}
