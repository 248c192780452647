//! Remote command queue.
//!
//! Uses an `embassy-sync` bounded channel to bridge remote adapters
//! (network callbacks, console) with the synchronous scheduler loop.
//! Producers never touch motor state; the loop drains the queue at a
//! tick boundary and applies commands in arrival order.
//!
//! ```text
//! ┌──────────────┐ RemoteCommand ┌────────────────┐
//! │ Remote input │──────────────▶│ Scheduler loop │
//! └──────────────┘               └────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::commands::RemoteCommand;
use crate::error::CommandError;

/// Commands queued between two ticks before producers see `QueueFull`.
pub const COMMAND_DEPTH: usize = 8;

pub type CommandChannel = Channel<CriticalSectionRawMutex, RemoteCommand, COMMAND_DEPTH>;

/// Inbound command channel: remote adapters → scheduler loop.
pub static REMOTE_COMMANDS: CommandChannel = Channel::new();

/// Producer handle. Rejects out-of-range motor indices at submission so
/// the core never sees them.
#[derive(Clone, Copy)]
pub struct CommandSender<'a> {
    channel: &'a CommandChannel,
    motor_count: u8,
}

impl<'a> CommandSender<'a> {
    pub fn new(channel: &'a CommandChannel, motor_count: u8) -> Self {
        Self { channel, motor_count }
    }

    pub fn submit(&self, cmd: RemoteCommand) -> Result<(), CommandError> {
        if let Some(motor) = cmd.motor() {
            if motor >= self.motor_count {
                warn!("remote command for motor {} out of range", motor);
                return Err(CommandError::MotorOutOfRange {
                    motor,
                    count: self.motor_count,
                });
            }
        }
        self.channel.try_send(cmd).map_err(|_| {
            warn!("remote command queue full, dropping {:?}", cmd);
            CommandError::QueueFull
        })
    }

    /// Parse and submit in one step.
    pub fn submit_raw(&self, topic: &str, payload: &str) -> Result<(), CommandError> {
        let cmd = RemoteCommand::parse(topic, payload).inspect_err(|e| {
            warn!("remote command rejected: {}", e);
        })?;
        self.submit(cmd)
    }
}
