//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A network status publisher would implement the same trait.

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { motors, buttons } => {
                info!("START | motors={} buttons={}", motors, buttons);
            }
            AppEvent::Gesture { button, gesture } => {
                info!("BUTTON | {} {:?}", button, gesture);
            }
            AppEvent::MotorChanged { motor, from, to } => {
                info!("MOTOR | {} {:?} -> {:?}", motor, from, to);
            }
            AppEvent::TimerArmed { motor, duration_ms } => {
                info!("TIMER | {} armed {} ms", motor, duration_ms);
            }
            AppEvent::TimerElapsed { motor } => {
                info!("TIMER | {} elapsed", motor);
            }
            AppEvent::MotorStatus(status) => {
                info!("STATUS | {}", status);
            }
            AppEvent::AllOff => {
                info!("STATUS | All off");
            }
            AppEvent::CommandRejected(e) => {
                info!("REMOTE | rejected: {}", e);
            }
            AppEvent::Fault(fault) => {
                error!("FAULT | {}", fault);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
        }
    }
}
