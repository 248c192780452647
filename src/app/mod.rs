//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the shutter controller:
//! gesture-to-motor bindings, remote command handling, and the per-tick
//! scheduling order. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
