//! Relay output.
//!
//! A relay is a line plus on/off semantics, nothing more. It never owns
//! the port it sits on and never looks at its sibling; keeping the up
//! and down relays of a motor exclusive is
//! [`MotorControl`](crate::control::motor::MotorControl)'s job.

use crate::app::ports::LineIo;
use crate::drivers::port::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relay {
    line: Line,
}

impl Relay {
    pub const fn new(line: Line) -> Self {
        Self { line }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn on(&self, io: &mut impl LineIo) {
        io.write_line(self.line, true);
    }

    pub fn off(&self, io: &mut impl LineIo) {
        io.write_line(self.line, false);
    }

    /// Energized? Expander lines answer from the last sync; native lines
    /// answer live.
    pub fn get(&self, io: &impl LineIo) -> bool {
        io.read_line(self.line)
    }
}
