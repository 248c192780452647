//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                 |
//! |------------|--------------|-----------------------------|
//! | `hardware` | NativeGpio   | ESP32 GPIO (relay pins)     |
//! | `log_sink` | EventSink    | Serial log output           |
//! | `time`     | Clock        | ESP32 high-resolution timer |
//!
//! The expander bus adapter lives with its register map in
//! [`drivers::pca9534`](crate::drivers::pca9534).

pub mod hardware;
pub mod log_sink;
pub mod time;
