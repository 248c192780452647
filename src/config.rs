//! System configuration: wiring tables and timing parameters.
//!
//! Describes which expander lines and native pins drive which relays,
//! which switch inputs drive which motors, and how long each shutter
//! takes to travel end to end. The default reproduces the installed
//! house wiring; a JSON document with the same shape can replace it.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::control::motor::Direction;
use crate::drivers::button::{DEFAULT_LONG_PRESS_MS, DEFAULT_SHORT_PRESS_MS};
use crate::drivers::port::{Line, PORT_WIDTH, PortSel, WriteMode};
use crate::error::ConfigError;
use crate::pins;

/// Arena capacities. Cardinalities are fixed at build time.
pub const MAX_PORTS: usize = 8;
pub const MAX_MOTORS: usize = 16;
pub const MAX_BUTTONS: usize = 32;
pub const MAX_NATIVE_OUTPUTS: usize = 16;

/// End-to-end travel times of the installed shutter sizes.
pub const TRAVEL_NORMAL_MS: u32 = 33_000;
pub const TRAVEL_THIN_MS: u32 = 37_000;
pub const TRAVEL_BIG_MS: u32 = 73_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpanderConfig {
    /// 7-bit I²C address.
    pub address: u8,
    /// 1 = input, 0 = output.
    pub direction_mask: u8,
    #[serde(default)]
    pub write_mode: WriteMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub up: Line,
    pub down: Line,
    /// Auto-off budget armed after a start.
    pub travel_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub input: Line,
    pub direction: Direction,
    /// One motor, or several for a group button.
    pub targets: Vec<u8, MAX_MOTORS>,
    /// Pressed reads as low.
    #[serde(default)]
    pub active_low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Expanders in port-id order: the first entry is `PortId(0)`.
    pub expanders: Vec<ExpanderConfig, MAX_PORTS>,
    /// MCU pins used as relay outputs.
    #[serde(default)]
    pub native_outputs: Vec<u8, MAX_NATIVE_OUTPUTS>,
    pub motors: Vec<MotorConfig, MAX_MOTORS>,
    pub buttons: Vec<ButtonConfig, MAX_BUTTONS>,

    #[serde(default = "default_short_press_ms")]
    pub short_press_ms: u32,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u32,

    /// Scheduler loop period.
    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u32,

    /// Arm the travel timer when a remote command starts a motor.
    #[serde(default = "default_remote_auto_arm")]
    pub remote_auto_arm: bool,
}

fn default_short_press_ms() -> u32 {
    DEFAULT_SHORT_PRESS_MS
}

fn default_long_press_ms() -> u32 {
    DEFAULT_LONG_PRESS_MS
}

fn default_loop_interval_ms() -> u32 {
    10
}

fn default_remote_auto_arm() -> bool {
    true
}

// Expander indices of the default wiring.
const OUT: u8 = 0;
const MIXED: u8 = 1;
const IN_A: u8 = 2;
const IN_B: u8 = 3;

/// Living-room shutters driven together by the common buttons.
const LIVING_ROOM: &[u8] = &[0, 1, 3, 6, 7];
const WHOLE_HOUSE: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];

fn vec_of<T: Clone, const N: usize>(items: &[T]) -> Vec<T, N> {
    items.iter().take(N).cloned().collect()
}

fn motor(up: Line, down: Line, travel_ms: u32) -> MotorConfig {
    MotorConfig { up, down, travel_ms }
}

fn button(port: u8, pin: u8, direction: Direction, targets: &[u8]) -> ButtonConfig {
    ButtonConfig {
        input: Line::expander(port, pin),
        direction,
        targets: vec_of(targets),
        active_low: false,
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        use Direction::{Down, Up};

        let expanders = [
            ExpanderConfig { address: pins::EXPANDER_OUT_ADDR, direction_mask: 0x00, write_mode: WriteMode::WriteThrough },
            ExpanderConfig { address: pins::EXPANDER_MIXED_ADDR, direction_mask: 0x0F, write_mode: WriteMode::WriteThrough },
            ExpanderConfig { address: pins::EXPANDER_IN_A_ADDR, direction_mask: 0xFF, write_mode: WriteMode::WriteThrough },
            ExpanderConfig { address: pins::EXPANDER_IN_B_ADDR, direction_mask: 0xFF, write_mode: WriteMode::WriteThrough },
        ];

        let motors = [
            motor(Line::native(pins::RELAY_M0_UP_GPIO), Line::native(pins::RELAY_M0_DOWN_GPIO), TRAVEL_THIN_MS),
            motor(Line::native(pins::RELAY_M1_UP_GPIO), Line::native(pins::RELAY_M1_DOWN_GPIO), TRAVEL_THIN_MS),
            motor(Line::expander(MIXED, 5), Line::expander(MIXED, 4), TRAVEL_NORMAL_MS),
            motor(Line::expander(MIXED, 7), Line::expander(MIXED, 6), TRAVEL_NORMAL_MS),
            motor(Line::expander(OUT, 1), Line::expander(OUT, 0), TRAVEL_NORMAL_MS),
            motor(Line::expander(OUT, 3), Line::expander(OUT, 2), TRAVEL_NORMAL_MS),
            motor(Line::expander(OUT, 4), Line::expander(OUT, 5), TRAVEL_BIG_MS),
            motor(Line::expander(OUT, 6), Line::expander(OUT, 7), TRAVEL_THIN_MS),
        ];

        let buttons = [
            button(IN_B, 7, Up, &[3]),   // living-room window
            button(IN_B, 5, Down, &[3]),
            button(MIXED, 1, Up, &[1]),  // living room 1
            button(MIXED, 3, Down, &[1]),
            button(IN_A, 1, Up, &[0]),   // living room 2
            button(IN_A, 3, Down, &[0]),
            button(IN_A, 6, Up, &[7]),   // living room 3
            button(IN_A, 4, Down, &[7]),
            button(IN_B, 1, Up, &[6]),   // living-room door
            button(IN_B, 3, Down, &[6]),
            button(IN_B, 6, Up, LIVING_ROOM),
            button(IN_B, 4, Down, LIVING_ROOM),
            button(IN_A, 7, Up, &[2]),   // kitchen
            button(IN_A, 5, Down, &[2]),
            button(IN_B, 2, Up, WHOLE_HOUSE), // entrance
            button(IN_B, 0, Down, WHOLE_HOUSE),
            button(MIXED, 0, Up, &[4]),  // study
            button(MIXED, 2, Down, &[4]),
            button(IN_A, 0, Up, &[5]),   // guest room
            button(IN_A, 2, Down, &[5]),
        ];

        Self {
            expanders: vec_of(&expanders),
            native_outputs: vec_of(&pins::NATIVE_RELAY_GPIOS),
            motors: vec_of(&motors),
            buttons: vec_of(&buttons),
            short_press_ms: DEFAULT_SHORT_PRESS_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            loop_interval_ms: default_loop_interval_ms(),
            remote_auto_arm: true,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON wiring document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config parse failed: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject wiring that could violate the relay interlock or address
    /// hardware that does not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, exp) in self.expanders.iter().enumerate() {
            if self.expanders[..i].iter().any(|e| e.address == exp.address) {
                return Err(ConfigError::DuplicateAddress(exp.address));
            }
        }

        if self.short_press_ms == 0 || self.short_press_ms >= self.long_press_ms {
            return Err(ConfigError::ThresholdOrder);
        }
        if self.loop_interval_ms == 0 {
            return Err(ConfigError::ZeroLoopInterval);
        }

        let mut relay_lines: Vec<Line, { 2 * MAX_MOTORS }> = Vec::new();
        for (i, m) in self.motors.iter().enumerate() {
            let motor = i as u8;
            for line in [m.up, m.down] {
                match self.expander_bit(line)? {
                    Some(true) => return Err(ConfigError::RelayOnInputLine { motor }),
                    Some(false) => {}
                    None => {
                        if !self.native_outputs.contains(&line.pin) {
                            return Err(ConfigError::NativePinNotOutput(line.pin));
                        }
                    }
                }
                if relay_lines.contains(&line) {
                    return Err(ConfigError::SharedRelayLine { motor });
                }
                let _ = relay_lines.push(line);
            }

            if m.up.port != m.down.port && (self.is_deferred(m.up) || self.is_deferred(m.down)) {
                return Err(ConfigError::SplitDeferredMotor { motor });
            }
            if m.travel_ms == 0 {
                return Err(ConfigError::ZeroTravelTime { motor });
            }
        }

        for (i, b) in self.buttons.iter().enumerate() {
            let button = i as u8;
            let on_output = match self.expander_bit(b.input)? {
                Some(is_input) => !is_input,
                None => self.native_outputs.contains(&b.input.pin),
            };
            if on_output {
                return Err(ConfigError::ButtonOnOutputLine { button });
            }
            if b.direction == Direction::Off {
                return Err(ConfigError::OffDirectionButton { button });
            }
            if b.targets.is_empty() || b.targets.iter().any(|&t| t as usize >= self.motors.len()) {
                return Err(ConfigError::BadButtonTarget { button });
            }
        }

        Ok(())
    }

    /// Direction bit of an expander line (`true` = input), or `None` for
    /// native pins.
    fn expander_bit(&self, line: Line) -> Result<Option<bool>, ConfigError> {
        match line.port {
            PortSel::Native => Ok(None),
            PortSel::Expander(id) => {
                let exp = self
                    .expanders
                    .get(id.index())
                    .ok_or(ConfigError::UnknownPort(id.0))?;
                if line.pin >= PORT_WIDTH {
                    return Err(ConfigError::PinOutOfRange(line.pin));
                }
                Ok(Some(exp.direction_mask & (1 << line.pin) != 0))
            }
        }
    }

    fn is_deferred(&self, line: Line) -> bool {
        match line.port {
            PortSel::Native => false,
            PortSel::Expander(id) => self
                .expanders
                .get(id.index())
                .is_some_and(|e| e.write_mode == WriteMode::Deferred),
        }
    }
}
