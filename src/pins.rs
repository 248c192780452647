//! Board pin and bus-address assignments for the shutter controller.
//!
//! Single source of truth: the default wiring in [`crate::config`] and
//! the firmware entry point reference this module rather than hard-coding
//! numbers.

// ---------------------------------------------------------------------------
// I²C bus (PCA9534 port expanders)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode clock; the expanders are polled once per loop pass.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Expander addresses
// ---------------------------------------------------------------------------

/// All eight lines drive relays.
pub const EXPANDER_OUT_ADDR: u8 = 0x20;
/// Lines 0–3 are switch inputs, lines 4–7 drive relays.
pub const EXPANDER_MIXED_ADDR: u8 = 0x22;
/// Wall-switch inputs, bank A.
pub const EXPANDER_IN_A_ADDR: u8 = 0x21;
/// Wall-switch inputs, bank B.
pub const EXPANDER_IN_B_ADDR: u8 = 0x24;

// ---------------------------------------------------------------------------
// Native relay outputs (motors 0 and 1)
// ---------------------------------------------------------------------------

pub const RELAY_M0_DOWN_GPIO: u8 = 25;
pub const RELAY_M0_UP_GPIO: u8 = 26;
pub const RELAY_M1_DOWN_GPIO: u8 = 32;
pub const RELAY_M1_UP_GPIO: u8 = 33;

/// Every MCU pin that drives a relay; driven low during bring-up.
pub const NATIVE_RELAY_GPIOS: [u8; 4] = [
    RELAY_M0_DOWN_GPIO,
    RELAY_M0_UP_GPIO,
    RELAY_M1_DOWN_GPIO,
    RELAY_M1_UP_GPIO,
];
