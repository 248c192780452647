//! Outbound application events.
//!
//! The [`ShutterController`](super::service::ShutterController) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them: log to serial, publish a status
//! topic, blink an LED.

use core::fmt;

use crate::control::motor::Direction;
use crate::drivers::button::GestureEvent;
use crate::error::{CommandError, HardwareFault};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Ports configured, native outputs driven low.
    Started { motors: u8, buttons: u8 },

    /// A button completed a gesture.
    Gesture { button: u8, gesture: GestureEvent },

    /// A motor changed direction.
    MotorChanged { motor: u8, from: Direction, to: Direction },

    /// An auto-off timer was armed.
    TimerArmed { motor: u8, duration_ms: u32 },

    /// An auto-off timer elapsed and stopped its motor.
    TimerElapsed { motor: u8 },

    /// Reply to a remote command for one motor.
    MotorStatus(MotorStatus),

    /// Reply to a remote all-off command.
    AllOff,

    /// A remote command was rejected at the boundary.
    CommandRejected(CommandError),

    /// A hardware fault was detected; affected motors are off.
    Fault(HardwareFault),

    /// Every latched fault has cleared.
    FaultCleared,
}

/// Motor state as reported to remote collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorStatus {
    pub motor: u8,
    pub state: Direction,
}

/// Renders as `{id}↑`, `{id}↓` or `{id}x`.
impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = match self.state {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Off => "x",
        };
        write!(f, "{{{}}}{}", self.motor, glyph)
    }
}
