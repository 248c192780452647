//! Unified error types for the shutter controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! binary edge can report any failure uniformly. All variants are `Copy`
//! so they can be passed through the event sink and the interlock
//! supervisor without allocation.

use core::fmt;

use crate::control::motor::Direction;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An expander bus transaction failed.
    Bus(BusError),
    /// The wiring configuration is inconsistent.
    Config(ConfigError),
    /// A remote command was malformed or out of range.
    Command(CommandError),
    /// A hardware fault was detected on an actuator.
    Fault(HardwareFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Fault(e) => write!(f, "fault: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Which register transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    ReadInput,
    WriteOutput,
    WriteConfig,
}

/// A failed expander transaction, tagged with the 7-bit device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError {
    pub address: u8,
    pub op: BusOp,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            BusOp::ReadInput => "input read",
            BusOp::WriteOutput => "output write",
            BusOp::WriteConfig => "config write",
        };
        write!(f, "{op} failed on expander 0x{:02x}", self.address)
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    Malformed,
    /// More expanders, motors or buttons than the fixed arenas hold.
    CapacityExceeded(&'static str),
    /// Two expanders share an I²C address.
    DuplicateAddress(u8),
    /// A line refers to an expander index that does not exist.
    UnknownPort(u8),
    /// A pin index is outside the 8-line bank.
    PinOutOfRange(u8),
    /// A native relay pin is not listed among the native outputs.
    NativePinNotOutput(u8),
    /// A relay line is configured as an input on its expander.
    RelayOnInputLine { motor: u8 },
    /// A button line is configured as an output on its expander.
    ButtonOnOutputLine { button: u8 },
    /// Two relays (on the same or different motors) share one line.
    SharedRelayLine { motor: u8 },
    /// A motor on a deferred-write port must keep both relays on that port.
    SplitDeferredMotor { motor: u8 },
    /// Auto-off travel time must be non-zero.
    ZeroTravelTime { motor: u8 },
    /// A button has no target motor or targets a missing one.
    BadButtonTarget { button: u8 },
    /// A button was bound to the `Off` direction.
    OffDirectionButton { button: u8 },
    /// Short-press threshold must be non-zero and below the long threshold.
    ThresholdOrder,
    /// Scheduler loop interval must be non-zero.
    ZeroLoopInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed configuration document"),
            Self::CapacityExceeded(what) => write!(f, "too many {what}"),
            Self::DuplicateAddress(addr) => write!(f, "duplicate expander address 0x{addr:02x}"),
            Self::UnknownPort(idx) => write!(f, "unknown expander index {idx}"),
            Self::PinOutOfRange(pin) => write!(f, "pin {pin} out of range"),
            Self::NativePinNotOutput(pin) => write!(f, "native pin {pin} is not a configured output"),
            Self::RelayOnInputLine { motor } => write!(f, "motor {motor} relay is on an input line"),
            Self::ButtonOnOutputLine { button } => write!(f, "button {button} is on an output line"),
            Self::SharedRelayLine { motor } => write!(f, "motor {motor} shares a relay line"),
            Self::SplitDeferredMotor { motor } => {
                write!(f, "motor {motor} relays split across a deferred-write port")
            }
            Self::ZeroTravelTime { motor } => write!(f, "motor {motor} has zero travel time"),
            Self::BadButtonTarget { button } => write!(f, "button {button} has an invalid target"),
            Self::OffDirectionButton { button } => write!(f, "button {button} is bound to Off"),
            Self::ThresholdOrder => write!(f, "short-press threshold must be in (0, long)"),
            Self::ZeroLoopInterval => write!(f, "loop interval must be non-zero"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Remote command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Direction token is not `up`, `down` or `off`.
    UnknownDirection,
    /// Motor index payload is not a decimal integer.
    MalformedIndex,
    /// Motor index is not below the configured motor count.
    MotorOutOfRange { motor: u8, count: u8 },
    /// The command queue is full; the command was dropped.
    QueueFull,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDirection => write!(f, "unknown direction"),
            Self::MalformedIndex => write!(f, "malformed motor index"),
            Self::MotorOutOfRange { motor, count } => {
                write!(f, "motor {motor} out of range (count {count})")
            }
            Self::QueueFull => write!(f, "command queue full"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware faults
// ---------------------------------------------------------------------------

/// Faults are reported, never auto-corrected beyond forcing the affected
/// motors off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    /// Both relay lines of a motor read back asserted.
    BothRelaysEnergized { motor: u8 },
    /// One relay line reads back asserted while the motor does not
    /// command it.
    RelayStuck { motor: u8, relay: Direction },
    /// An expander stopped answering.
    Bus(BusError),
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BothRelaysEnergized { motor } => {
                write!(f, "both relays energized on motor {motor}")
            }
            Self::RelayStuck { motor, relay } => {
                write!(f, "motor {motor} {relay:?} relay energized without command")
            }
            Self::Bus(e) => write!(f, "{e}"),
        }
    }
}

impl From<HardwareFault> for Error {
    fn from(e: HardwareFault) -> Self {
        Self::Fault(e)
    }
}
