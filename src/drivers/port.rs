//! Cached digital port over a PCA9534 expander.
//!
//! ## Cache discipline
//!
//! Every logical read is served from the input cache and every logical
//! write lands in the output cache. Hardware is touched by exactly one
//! call per tick, [`DigitalPort::synchronize`], which reads the input
//! register, rewrites the output register and reasserts the direction
//! register. The bus is orders of magnitude slower than the control
//! loop, so per-tick traffic stays bounded no matter how many relays
//! and buttons share the port.
//!
//! ## Write modes
//!
//! | Mode           | `write()` pushes to hardware | Output writes per tick |
//! |----------------|------------------------------|------------------------|
//! | `WriteThrough` | immediately                  | 1 per write + 1 sync   |
//! | `Deferred`     | never                        | exactly 1 (sync)       |
//!
//! Write-through keeps relay ordering visible on the wire (down-off
//! lands before up-on). Deferred batches a whole tick into one byte,
//! which is only safe when both relays of every motor live on the same
//! port; [`SystemConfig::validate`](crate::config::SystemConfig::validate)
//! enforces that.

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::ExpanderBus;
use crate::drivers::pca9534::{RESET_CONFIGURATION, Register};
use crate::error::{BusError, BusOp};

/// Lines per port.
pub const PORT_WIDTH: u8 = 8;

/// Stable index into the port arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub u8);

impl PortId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which bank a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortSel {
    /// An MCU pin; `pin` is the GPIO number.
    Native,
    /// A cached expander port; `pin` is 0–7.
    Expander(PortId),
}

/// One digital line: a bank plus a pin within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub port: PortSel,
    pub pin: u8,
}

impl Line {
    pub const fn native(pin: u8) -> Self {
        Self { port: PortSel::Native, pin }
    }

    pub const fn expander(port: u8, pin: u8) -> Self {
        Self {
            port: PortSel::Expander(PortId(port)),
            pin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    #[default]
    WriteThrough,
    Deferred,
}

pub struct DigitalPort {
    address: u8,
    input: u8,
    output: u8,
    /// 1 = input, 0 = output.
    direction: u8,
    mode: WriteMode,
    /// Last input read failed; `input` holds the previous good value.
    stale: bool,
    /// Output byte the chip last acknowledged, `None` after a failed push.
    latched: Option<u8>,
    /// Value of `latched` when `input` was sampled.
    sampled: Option<u8>,
}

impl DigitalPort {
    /// A port in the chip's reset state: all inputs, outputs latched low.
    pub fn new(address: u8, mode: WriteMode) -> Self {
        Self {
            address,
            input: 0,
            output: 0,
            direction: RESET_CONFIGURATION,
            mode,
            stale: false,
            latched: None,
            sampled: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn direction(&self) -> u8 {
        self.direction
    }

    pub fn output_bits(&self) -> u8 {
        self.output
    }

    /// True when the last [`synchronize`](Self::synchronize) could not
    /// read the input register.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// True when the cached input bit of `pin` was sampled after the chip
    /// latched the current output bit, so an output line's readback can be
    /// compared with what was written.
    pub fn readback_settled(&self, pin: u8) -> bool {
        pin < PORT_WIDTH
            && !self.stale
            && self.sampled.is_some_and(|s| (s ^ self.output) & (1 << pin) == 0)
    }

    /// Bring-up: push the output cache, apply `direction_mask` and take a
    /// first input sample. Must run before the first `synchronize`.
    pub fn configure<B: ExpanderBus>(&mut self, direction_mask: u8, bus: &mut B) -> Result<(), BusError> {
        self.direction = direction_mask;
        self.push_output(bus)?;
        self.push(bus, Register::Configuration, self.direction, BusOp::WriteConfig)?;
        self.pull(bus)
    }

    /// Set one output bit. Write-through ports push the whole output byte
    /// now; a failed push is logged and repaired by the next sync.
    pub fn write<B: ExpanderBus>(&mut self, pin: u8, high: bool, bus: &mut B) {
        debug_assert!(pin < PORT_WIDTH, "pin {pin} out of range");
        if pin >= PORT_WIDTH {
            error!("port 0x{:02x}: write to pin {} out of range", self.address, pin);
            return;
        }
        if self.direction & (1 << pin) != 0 {
            warn!("port 0x{:02x}: write to input-configured pin {}", self.address, pin);
        }

        if high {
            self.output |= 1 << pin;
        } else {
            self.output &= !(1 << pin);
        }

        if self.mode == WriteMode::WriteThrough {
            if let Err(e) = self.push_output(bus) {
                warn!("{e}; retrying at next sync");
            }
        }
    }

    /// Cached input bit. Never touches hardware.
    pub fn read(&self, pin: u8) -> bool {
        debug_assert!(pin < PORT_WIDTH, "pin {pin} out of range");
        pin < PORT_WIDTH && self.input & (1 << pin) != 0
    }

    /// Hardware round-trip: sample inputs, rewrite outputs, reassert
    /// direction. All three are attempted; the first failure is returned.
    pub fn synchronize<B: ExpanderBus>(&mut self, bus: &mut B) -> Result<(), BusError> {
        let read = self.pull(bus);
        let output = self.push_output(bus);
        let config = self.push(bus, Register::Configuration, self.direction, BusOp::WriteConfig);
        read.and(output).and(config)
    }

    fn pull<B: ExpanderBus>(&mut self, bus: &mut B) -> Result<(), BusError> {
        match bus.read_register(self.address, Register::Input.addr()) {
            Ok(bits) => {
                self.input = bits;
                self.stale = false;
                self.sampled = self.latched;
                Ok(())
            }
            Err(e) => {
                self.stale = true;
                log::debug!("port 0x{:02x}: input read error {:?}", self.address, e);
                Err(BusError {
                    address: self.address,
                    op: BusOp::ReadInput,
                })
            }
        }
    }

    fn push_output<B: ExpanderBus>(&mut self, bus: &mut B) -> Result<(), BusError> {
        let result = self.push(bus, Register::Output, self.output, BusOp::WriteOutput);
        self.latched = result.is_ok().then_some(self.output);
        result
    }

    fn push<B: ExpanderBus>(&self, bus: &mut B, reg: Register, value: u8, op: BusOp) -> Result<(), BusError> {
        bus.write_register(self.address, reg.addr(), value).map_err(|e| {
            log::debug!("port 0x{:02x}: {:?} error {:?}", self.address, reg, e);
            BusError {
                address: self.address,
                op,
            }
        })
    }
}
