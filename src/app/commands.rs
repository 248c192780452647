//! Inbound remote commands.
//!
//! A remote collaborator (MQTT bridge, serial console, scheduler) names a
//! direction and a motor index. The direction comes either as a bare
//! token (`up`, `down`, `off`) or as a topic whose last `/`-separated
//! segment is such a token, e.g. `cmnd/shutter/up`. The payload carries
//! the decimal motor index.
//!
//! | Direction | Payload     | Command                          |
//! |-----------|-------------|----------------------------------|
//! | `up`      | `"3"`       | `Motor { motor: 3, Up }`         |
//! | `down`    | `"0"`       | `Motor { motor: 0, Down }`       |
//! | `off`     | `"5"`       | `Motor { motor: 5, Off }`        |
//! | `off`     | empty       | `AllOff`                         |
//! | `up`      | empty / bad | `CommandError::MalformedIndex`   |

use crate::control::motor::Direction;
use crate::error::CommandError;

/// Commands that remote adapters can send into the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Toggle one motor in `direction`; `Off` stops it.
    Motor { motor: u8, direction: Direction },
    /// Stop every motor.
    AllOff,
}

impl RemoteCommand {
    /// Parse a direction token or topic plus a motor index payload.
    pub fn parse(topic: &str, payload: &str) -> Result<Self, CommandError> {
        let direction = parse_direction(topic)?;
        let payload = payload.trim();

        if payload.is_empty() && direction == Direction::Off {
            return Ok(Self::AllOff);
        }

        let motor = payload
            .parse::<u8>()
            .map_err(|_| CommandError::MalformedIndex)?;
        Ok(Self::Motor { motor, direction })
    }

    /// Motor addressed by this command, if it names one.
    pub fn motor(&self) -> Option<u8> {
        match self {
            Self::Motor { motor, .. } => Some(*motor),
            Self::AllOff => None,
        }
    }
}

fn parse_direction(topic: &str) -> Result<Direction, CommandError> {
    let token = topic.trim().rsplit('/').next().unwrap_or_default();
    if token.eq_ignore_ascii_case("up") {
        Ok(Direction::Up)
    } else if token.eq_ignore_ascii_case("down") {
        Ok(Direction::Down)
    } else if token.eq_ignore_ascii_case("off") {
        Ok(Direction::Off)
    } else {
        Err(CommandError::UnknownDirection)
    }
}
