//! Shutter motor control: direction interlock and auto-off timer.
//!
//! Each motor is a pair of relays, one per direction. Energizing both
//! shorts the motor windings, so every transition goes through
//! [`MotorControl::set`], which drops both relays before raising the
//! requested one:
//!
//! ```text
//!            toggle(d)               toggle(*) / off / timer
//!   OFF ─────────────────▶ UP|DOWN ─────────────────────────▶ OFF
//! ```
//!
//! A moving motor is always stopped first by `toggle`; reversing needs a
//! second toggle. The auto-off timer is armed explicitly by the caller
//! (never by `set`) and is disarmed by every path into `Off`.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::LineIo;
use crate::drivers::relay::Relay;
use crate::error::HardwareFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Off,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AutoOff {
    armed_at_ms: u32,
    duration_ms: u32,
}

pub struct MotorControl {
    id: u8,
    state: Direction,
    up: Relay,
    down: Relay,
    timer: Option<AutoOff>,
}

impl MotorControl {
    pub fn new(id: u8, up: Relay, down: Relay) -> Self {
        Self {
            id,
            state: Direction::Off,
            up,
            down,
            timer: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn state(&self) -> Direction {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state != Direction::Off
    }

    pub fn up_relay(&self) -> Relay {
        self.up
    }

    pub fn down_relay(&self) -> Relay {
        self.down
    }

    /// Drive to `direction`: both relays off, then the requested one on.
    pub fn set(&mut self, direction: Direction, io: &mut impl LineIo) {
        self.down.off(io);
        self.up.off(io);
        match direction {
            Direction::Up => self.up.on(io),
            Direction::Down => self.down.on(io),
            Direction::Off => {}
        }
        self.state = direction;

        if direction == Direction::Off {
            self.disarm_timer();
            debug!("Motor {} stopped", self.id);
        } else {
            debug!("Motor {} going {:?}", self.id, direction);
        }
    }

    /// Start in `direction` when idle; stop when moving, whatever was asked.
    pub fn toggle(&mut self, direction: Direction, io: &mut impl LineIo) {
        if self.state == Direction::Off {
            self.set(direction, io);
        } else {
            self.set(Direction::Off, io);
        }
    }

    pub fn off(&mut self, io: &mut impl LineIo) {
        self.set(Direction::Off, io);
    }

    /// Schedule an automatic stop `duration_ms` after `now_ms`.
    /// Refused (returns `false`) while the motor is off.
    pub fn arm_timer(&mut self, duration_ms: u32, now_ms: u32) -> bool {
        if self.state == Direction::Off {
            warn!("Motor {}: timer arm ignored while off", self.id);
            return false;
        }
        self.timer = Some(AutoOff {
            armed_at_ms: now_ms,
            duration_ms,
        });
        debug!("Motor {} timer set to {} ms", self.id, duration_ms);
        true
    }

    pub fn disarm_timer(&mut self) {
        if self.timer.take().is_some() {
            debug!("Motor {} timer cancelled", self.id);
        }
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Milliseconds until auto-off, if armed.
    pub fn timer_remaining(&self, now_ms: u32) -> Option<u32> {
        self.timer.map(|t| {
            t.duration_ms
                .saturating_sub(now_ms.wrapping_sub(t.armed_at_ms))
        })
    }

    /// Advance the auto-off timer. Returns `true` if it elapsed and the
    /// motor was stopped on this call.
    pub fn tick(&mut self, now_ms: u32, io: &mut impl LineIo) -> bool {
        let Some(timer) = self.timer else {
            return false;
        };
        if now_ms.wrapping_sub(timer.armed_at_ms) >= timer.duration_ms {
            info!("Motor {} timer elapsed", self.id);
            self.off(io);
            return true;
        }
        false
    }

    /// Read both relay lines back and compare them with the commanded
    /// direction. A line high that the state does not command is a welded
    /// contact or a wiring fault: a moving motor is forced off, and the
    /// fault is returned on every check until the readback agrees.
    pub fn check_relays(&mut self, io: &mut impl LineIo) -> Result<(), HardwareFault> {
        let up = self.up.get(&*io);
        let down = self.down.get(&*io);
        let stray_up = up && self.state != Direction::Up;
        let stray_down = down && self.state != Direction::Down;
        if !stray_up && !stray_down {
            return Ok(());
        }

        if self.is_moving() {
            error!(
                "Motor {}: relay readback up={} down={} while {:?}, forcing off",
                self.id, up, down, self.state
            );
            self.off(io);
        }
        Err(if up && down {
            HardwareFault::BothRelaysEnergized { motor: self.id }
        } else {
            HardwareFault::RelayStuck {
                motor: self.id,
                relay: if stray_up { Direction::Up } else { Direction::Down },
            }
        })
    }
}
