//! Port arena: every expander port plus the native pseudo-port.
//!
//! Relays and buttons hold [`Line`]s, never ports. A line resolves
//! through the bank to either a cached [`DigitalPort`] (by [`PortId`])
//! or a live native pin. The bank owns the shared expander bus so each
//! port can borrow it for its own transactions.

use heapless::Vec;
use log::error;

use crate::app::ports::{ExpanderBus, LineIo, NativeGpio};
use crate::config::MAX_PORTS;
use crate::drivers::port::{DigitalPort, Line, PortId, PortSel, WriteMode};
use crate::error::{BusError, ConfigError};

pub struct IoBank<B, G> {
    bus: B,
    native: G,
    ports: Vec<DigitalPort, MAX_PORTS>,
}

impl<B: ExpanderBus, G: NativeGpio> IoBank<B, G> {
    pub fn new(bus: B, native: G) -> Self {
        Self {
            bus,
            native,
            ports: Vec::new(),
        }
    }

    /// Register an expander. Ids are handed out in registration order.
    pub fn add_port(&mut self, address: u8, mode: WriteMode) -> Result<PortId, ConfigError> {
        let id = PortId(self.ports.len() as u8);
        self.ports
            .push(DigitalPort::new(address, mode))
            .map_err(|_| ConfigError::CapacityExceeded("expanders"))?;
        Ok(id)
    }

    pub fn configure_port(&mut self, id: PortId, direction_mask: u8) -> Result<(), BusError> {
        match self.ports.get_mut(id.index()) {
            Some(port) => port.configure(direction_mask, &mut self.bus),
            None => {
                error!("configure: unknown port {}", id.0);
                Ok(())
            }
        }
    }

    /// Configure a native relay pin as an output, driven low.
    pub fn configure_native_output(&mut self, pin: u8) {
        self.native.configure_output(pin);
        self.native.set_level(pin, false);
    }

    pub fn configure_native_input(&mut self, pin: u8) {
        self.native.configure_input(pin);
    }

    pub fn synchronize(&mut self, id: PortId) -> Result<(), BusError> {
        match self.ports.get_mut(id.index()) {
            Some(port) => port.synchronize(&mut self.bus),
            None => Ok(()),
        }
    }

    pub fn port(&self, id: PortId) -> Option<&DigitalPort> {
        self.ports.get(id.index())
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// True if `line` sits on an expander whose last input read failed.
    pub fn is_stale(&self, line: Line) -> bool {
        match line.port {
            PortSel::Native => false,
            PortSel::Expander(id) => self.port(id).is_some_and(DigitalPort::is_stale),
        }
    }

    /// True if the cached level of `line` reflects its current output
    /// bit. Native pins are read live and always qualify.
    pub fn readback_settled(&self, line: Line) -> bool {
        match line.port {
            PortSel::Native => true,
            PortSel::Expander(id) => self.port(id).is_some_and(|p| p.readback_settled(line.pin)),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn native(&self) -> &G {
        &self.native
    }

    pub fn native_mut(&mut self) -> &mut G {
        &mut self.native
    }
}

impl<B: ExpanderBus, G: NativeGpio> LineIo for IoBank<B, G> {
    fn write_line(&mut self, line: Line, high: bool) {
        match line.port {
            PortSel::Native => self.native.set_level(line.pin, high),
            PortSel::Expander(id) => match self.ports.get_mut(id.index()) {
                Some(port) => port.write(line.pin, high, &mut self.bus),
                None => error!("write to unknown port {}", id.0),
            },
        }
    }

    fn read_line(&self, line: Line) -> bool {
        match line.port {
            PortSel::Native => self.native.level(line.pin),
            PortSel::Expander(id) => self.port(id).is_some_and(|p| p.read(line.pin)),
        }
    }
}
