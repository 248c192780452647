//! Hardware adapter: MCU pins behind the [`NativeGpio`] port.
//!
//! This is the only module that drives native pins. On non-espidf
//! targets it keeps pin levels in a bitmask so the controller can run
//! in simulation.

use log::error;

use crate::app::ports::NativeGpio;
use crate::drivers::hw_init;

/// Concrete adapter for the board's directly wired relay pins.
#[derive(Default)]
pub struct BoardGpio {
    #[cfg(not(target_os = "espidf"))]
    levels: u64,
}

impl BoardGpio {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NativeGpio for BoardGpio {
    fn configure_output(&mut self, pin: u8) {
        if let Err(e) = hw_init::configure_output(pin) {
            error!("{}", e);
        }
    }

    fn configure_input(&mut self, pin: u8) {
        if let Err(e) = hw_init::configure_input(pin) {
            error!("{}", e);
        }
    }

    #[cfg(target_os = "espidf")]
    fn set_level(&mut self, pin: u8, high: bool) {
        hw_init::gpio_write(pin, high);
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_level(&mut self, pin: u8, high: bool) {
        hw_init::gpio_write(pin, high);
        let mask = 1u64 << (pin % 64);
        if high {
            self.levels |= mask;
        } else {
            self.levels &= !mask;
        }
    }

    #[cfg(target_os = "espidf")]
    fn level(&self, pin: u8) -> bool {
        hw_init::gpio_read(pin)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self, pin: u8) -> bool {
        self.levels & (1u64 << (pin % 64)) != 0
    }
}
