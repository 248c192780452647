//! Fuzz target: `ButtonGesture` driving `MotorControl`
//!
//! Interprets each input byte as one sample: bit 0 is the line level,
//! the upper bits advance the clock. Gestures are applied to a motor the
//! way a wall switch binding would. Verifies:
//! - No panics under arbitrary sample streams
//! - Releases never outnumber presses
//! - The two relay lines are never high together
//!
//! cargo fuzz run fuzz_gesture

#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use shutterctl::app::ports::LineIo;
use shutterctl::control::motor::{Direction, MotorControl};
use shutterctl::drivers::button::{ButtonGesture, GestureEvent};
use shutterctl::drivers::port::Line;
use shutterctl::drivers::relay::Relay;

const UP: Line = Line::expander(0, 1);
const DOWN: Line = Line::expander(0, 0);

#[derive(Default)]
struct Lines(HashMap<Line, bool>);

impl LineIo for Lines {
    fn write_line(&mut self, line: Line, high: bool) {
        self.0.insert(line, high);
        assert!(!(self.read_line(UP) && self.read_line(DOWN)), "relay interlock violated");
    }

    fn read_line(&self, line: Line) -> bool {
        self.0.get(&line).copied().unwrap_or(false)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut btn = ButtonGesture::new(0);
    let mut motor = MotorControl::new(0, Relay::new(UP), Relay::new(DOWN));
    let mut io = Lines::default();
    let mut now = u32::MAX - 10_000;
    let (mut presses, mut releases) = (0u32, 0u32);

    for &b in data {
        now = now.wrapping_add(u32::from(b >> 1) * 8);
        match btn.new_value(b & 1 != 0, now) {
            Some(GestureEvent::Press) => {
                presses += 1;
                motor.toggle(Direction::Up, &mut io);
            }
            Some(GestureEvent::ShortRelease) => {
                releases += 1;
                if motor.is_moving() {
                    motor.arm_timer(30_000, now);
                }
            }
            Some(GestureEvent::LongHold) => {
                releases += 1;
                motor.off(&mut io);
            }
            None => {}
        }
        motor.tick(now, &mut io);
        assert!(releases <= presses);
    }
});
