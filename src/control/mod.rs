//! Actuator control: per-motor state machines and fan-out sets.

pub mod motor;

use crate::config::MAX_MOTORS;

/// Bitmask of motor indices a binding fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorSet(u16);

const _: () = assert!(MAX_MOTORS <= 16, "MotorSet is a u16 mask");

impl MotorSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every motor below `count`.
    pub fn all(count: usize) -> Self {
        (0..count.min(MAX_MOTORS) as u8).collect()
    }

    pub fn insert(&mut self, motor: u8) {
        if (motor as usize) < MAX_MOTORS {
            self.0 |= 1 << motor;
        }
    }

    pub fn contains(&self, motor: u8) -> bool {
        (motor as usize) < MAX_MOTORS && self.0 & (1 << motor) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..MAX_MOTORS as u8).filter(|&m| self.contains(m))
    }
}

impl FromIterator<u8> for MotorSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::empty();
        for motor in iter {
            set.insert(motor);
        }
        set
    }
}
