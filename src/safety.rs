//! Interlock supervisor.
//!
//! Latches hardware faults so they are reported once when raised and once
//! when cleared, and so a motor cannot be restarted while the hardware
//! under it is suspect.
//!
//! ## Fault lifecycle
//!
//! 1. A relay readback shows a line asserted that the motor does not
//!    command, or an expander stops answering.
//! 2. The controller forces the affected motors off and the supervisor
//!    sets the matching bit.
//! 3. While a bit is set, starts of the affected motors are refused.
//!    Stopping is always allowed.
//! 4. Every tick the controller re-evaluates. A relay readback that
//!    matches the commanded direction, or a successful port sync, clears
//!    the bit. A contact that stays welded keeps its motor blocked.
//!
//! Relay faults are one bit per motor, bus faults one bit per port.

use log::{error, info};

use crate::config::{MAX_MOTORS, MAX_PORTS};
use crate::control::motor::MotorControl;
use crate::drivers::port::{PortId, PortSel};

const _: () = assert!(MAX_MOTORS <= 16 && MAX_PORTS <= 8);

#[derive(Debug, Default)]
pub struct InterlockSupervisor {
    /// Latched relay faults, bit per motor.
    relay_faults: u16,
    /// Latched bus faults, bit per port.
    bus_faults: u8,
}

impl InterlockSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the relay fault of `motor`. Returns `true` when the
    /// fault was newly raised.
    pub fn record_relay(&mut self, motor: u8, faulted: bool) -> bool {
        let mask = 1u16 << (motor as usize % MAX_MOTORS);
        let was = self.relay_faults & mask != 0;
        if faulted {
            self.relay_faults |= mask;
            if !was {
                error!("INTERLOCK FAULT SET: motor {} relays", motor);
            }
        } else {
            self.relay_faults &= !mask;
            if was {
                info!("INTERLOCK FAULT CLEARED: motor {} relays", motor);
            }
        }
        faulted && !was
    }

    /// Set or clear the bus fault of port `id`. Returns `true` when the
    /// fault was newly raised.
    pub fn record_bus(&mut self, id: PortId, faulted: bool) -> bool {
        let mask = 1u8 << (id.index() % MAX_PORTS);
        let was = self.bus_faults & mask != 0;
        if faulted {
            self.bus_faults |= mask;
            if !was {
                error!("INTERLOCK FAULT SET: port {} bus", id.0);
            }
        } else {
            self.bus_faults &= !mask;
            if was {
                info!("INTERLOCK FAULT CLEARED: port {} bus", id.0);
            }
        }
        faulted && !was
    }

    pub fn motor_faulted(&self, motor: u8) -> bool {
        (motor as usize) < MAX_MOTORS && self.relay_faults & (1 << motor) != 0
    }

    pub fn port_faulted(&self, id: PortId) -> bool {
        id.index() < MAX_PORTS && self.bus_faults & (1 << id.0) != 0
    }

    /// True if `motor` must not be started: its own relays are faulted or
    /// either relay sits on a faulted port.
    pub fn blocks(&self, motor: &MotorControl) -> bool {
        let on_faulted_port = |sel: PortSel| match sel {
            PortSel::Native => false,
            PortSel::Expander(id) => self.port_faulted(id),
        };
        self.motor_faulted(motor.id())
            || on_faulted_port(motor.up_relay().line().port)
            || on_faulted_port(motor.down_relay().line().port)
    }

    pub fn relay_faults(&self) -> u16 {
        self.relay_faults
    }

    /// True if **any** fault is latched.
    pub fn has_faults(&self) -> bool {
        self.relay_faults != 0 || self.bus_faults != 0
    }
}
