//! Line-level drivers: expander ports, relays, switches, and native pins.

pub mod button;
pub mod hw_init;
pub mod io_bank;
pub mod pca9534;
pub mod port;
pub mod relay;
