//! Wall-switch gesture detection.
//!
//! ## Hardware
//!
//! Momentary switches on expander input lines, sampled through the port
//! cache once per control tick. No ISR and no separate debounce stage:
//! the press threshold doubles as the debounce filter.
//!
//! ## Gesture detection
//!
//! | Gesture       | Condition                              | Event           |
//! |---------------|----------------------------------------|-----------------|
//! | Press         | Held ≥ short threshold (fires while held) | `Press`      |
//! | Short release | Released before the long threshold     | `ShortRelease`  |
//! | Long hold     | Released after ≥ long threshold        | `LongHold`      |
//!
//! Releases before the short threshold produce nothing. Both thresholds
//! are measured from the moment the line first asserted, and elapsed
//! time uses `wrapping_sub` so clock wraparound is harmless.

use log::debug;

pub const DEFAULT_SHORT_PRESS_MS: u32 = 100;
pub const DEFAULT_LONG_PRESS_MS: u32 = 750;

/// Classified gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Press,
    ShortRelease,
    LongHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Pressed,
    ShortConfirmed,
    LongConfirmed,
}

/// Receiver for classified gestures. All callbacks default to no-ops so
/// a binding only implements what it reacts to.
pub trait GestureHandler {
    fn on_press(&mut self, _button: u8) {}
    fn on_short_release(&mut self, _button: u8) {}
    fn on_long_hold(&mut self, _button: u8) {}
}

pub struct ButtonGesture {
    id: u8,
    state: GestureState,
    pressed_at_ms: u32,
    short_ms: u32,
    long_ms: u32,
}

impl ButtonGesture {
    pub fn new(id: u8) -> Self {
        Self::with_thresholds(id, DEFAULT_SHORT_PRESS_MS, DEFAULT_LONG_PRESS_MS)
    }

    pub fn with_thresholds(id: u8, short_ms: u32, long_ms: u32) -> Self {
        Self {
            id,
            state: GestureState::Idle,
            pressed_at_ms: 0,
            short_ms,
            long_ms,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Feed the current line level. Call once per control tick.
    /// Returns a classified gesture, if this sample completed one.
    pub fn new_value(&mut self, asserted: bool, now_ms: u32) -> Option<GestureEvent> {
        let held_ms = now_ms.wrapping_sub(self.pressed_at_ms);

        match (self.state, asserted) {
            (GestureState::Idle, true) => {
                self.state = GestureState::Pressed;
                self.pressed_at_ms = now_ms;
                debug!("Button {} down", self.id);
                None
            }
            (GestureState::Idle, false) | (GestureState::LongConfirmed, true) => None,

            (GestureState::Pressed, true) => {
                if held_ms >= self.short_ms {
                    self.state = GestureState::ShortConfirmed;
                    debug!("Button {} press", self.id);
                    return Some(GestureEvent::Press);
                }
                None
            }
            (GestureState::Pressed, false) => {
                self.state = GestureState::Idle;
                debug!("Button {} bounce ignored", self.id);
                None
            }

            (GestureState::ShortConfirmed, true) => {
                if held_ms >= self.long_ms {
                    self.state = GestureState::LongConfirmed;
                    debug!("Button {} long", self.id);
                }
                None
            }
            (GestureState::ShortConfirmed, false) => {
                self.state = GestureState::Idle;
                debug!("Button {} short release", self.id);
                Some(GestureEvent::ShortRelease)
            }

            (GestureState::LongConfirmed, false) => {
                self.state = GestureState::Idle;
                debug!("Button {} long release", self.id);
                Some(GestureEvent::LongHold)
            }
        }
    }

    /// Forward `event` to the matching handler callback.
    pub fn dispatch(&self, event: GestureEvent, handler: &mut impl GestureHandler) {
        match event {
            GestureEvent::Press => handler.on_press(self.id),
            GestureEvent::ShortRelease => handler.on_short_release(self.id),
            GestureEvent::LongHold => handler.on_long_hold(self.id),
        }
    }
}
