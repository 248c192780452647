//! Port traits: the hexagonal boundary between control logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ShutterController (domain)
//! ```
//!
//! Driven adapters (expander bus, native GPIO, event sinks, clocks)
//! implement these traits. The [`ShutterController`](super::service::ShutterController)
//! consumes them via generics, so the control core never touches
//! registers directly and runs unchanged against host-side mocks.

use crate::drivers::port::Line;

// ───────────────────────────────────────────────────────────────
// Expander bus (driven adapter: register-level I²C access)
// ───────────────────────────────────────────────────────────────

/// Single-register access to devices on the expander bus.
///
/// One call is one bus transaction. Implementations must not retry
/// internally; the caller decides what a failure means.
pub trait ExpanderBus {
    type Error: core::fmt::Debug;

    /// Write `value` into `register` of the device at `address`.
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Read `register` of the device at `address`.
    fn read_register(&mut self, address: u8, register: u8) -> Result<u8, Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Native GPIO (driven adapter: MCU pins)
// ───────────────────────────────────────────────────────────────

/// Directly addressable MCU pins. These bypass the port cache.
pub trait NativeGpio {
    /// Configure `pin` as a push-pull output with readback.
    fn configure_output(&mut self, pin: u8);

    /// Configure `pin` as a switch input.
    fn configure_input(&mut self, pin: u8);

    /// Drive `pin` high or low.
    fn set_level(&mut self, pin: u8, high: bool);

    /// Live level of `pin`.
    fn level(&self, pin: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Line access (what relays and buttons see)
// ───────────────────────────────────────────────────────────────

/// Logical line reads and writes, resolved against the port arena.
///
/// Expander lines hit the cache; native lines hit the pin.
pub trait LineIo {
    fn write_line(&mut self, line: Line, high: bool);
    fn read_line(&self, line: Line) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, remote
/// status topic, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Free-running millisecond clock. Wraps at `u32::MAX`; consumers must
/// compare timestamps with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}
