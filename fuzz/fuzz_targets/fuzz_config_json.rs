//! Fuzz target: `SystemConfig::from_json`
//!
//! Feeds arbitrary bytes to the wiring parser and verifies:
//! - No panics under any input
//! - Anything accepted also passes `validate()` and builds a controller
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use shutterctl::app::ports::{ExpanderBus, NativeGpio};
use shutterctl::app::service::ShutterController;
use shutterctl::config::SystemConfig;

struct NullBus;

impl ExpanderBus for NullBus {
    type Error = ();

    fn write_register(&mut self, _address: u8, _register: u8, _value: u8) -> Result<(), ()> {
        Ok(())
    }

    fn read_register(&mut self, _address: u8, _register: u8) -> Result<u8, ()> {
        Ok(0)
    }
}

struct NullGpio;

impl NativeGpio for NullGpio {
    fn configure_output(&mut self, _pin: u8) {}
    fn configure_input(&mut self, _pin: u8) {}
    fn set_level(&mut self, _pin: u8, _high: bool) {}
    fn level(&self, _pin: u8) -> bool {
        false
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json(text) {
        assert_eq!(config.validate(), Ok(()));
        assert!(ShutterController::new(&config, NullBus, NullGpio).is_ok());
    }
});
