//! Shutter controller: the hexagonal core.
//!
//! [`ShutterController`] owns the port arena, every motor and every
//! button. It exposes a hardware-agnostic tick API; all I/O flows
//! through the port traits injected at construction, so the whole
//! controller runs against host-side mocks.
//!
//! ```text
//!  ExpanderBus ──▶ ┌───────────────────────────────┐ ──▶ EventSink
//!   NativeGpio ──▶ │       ShutterController        │
//! CommandChannel ─▶│ ports · buttons · motors · lock │
//!                  └───────────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! | Step | Action                                                      |
//! |------|-------------------------------------------------------------|
//! | 1    | Synchronize input-group ports (bus faults force motors off) |
//! | 2    | Relay readback cross-check                                  |
//! | 3    | Feed every button; dispatch gestures to bound motors        |
//! | 4    | Drain queued remote commands in arrival order               |
//! | 5    | Advance every auto-off timer                                |
//! | 6    | Synchronize output-group ports                              |
//!
//! A port with both input and output lines is in both groups and syncs
//! twice per tick.

use heapless::Vec;
use log::{info, warn};

use crate::config::{MAX_BUTTONS, MAX_MOTORS, MAX_NATIVE_OUTPUTS, MAX_PORTS, SystemConfig};
use crate::control::MotorSet;
use crate::control::motor::{Direction, MotorControl};
use crate::drivers::button::{ButtonGesture, GestureHandler};
use crate::drivers::io_bank::IoBank;
use crate::drivers::port::{Line, PortId, PortSel};
use crate::drivers::relay::Relay;
use crate::error::{BusError, CommandError, ConfigError, Error, HardwareFault};
use crate::safety::InterlockSupervisor;

use super::channels::CommandChannel;
use super::commands::RemoteCommand;
use super::events::{AppEvent, MotorStatus};
use super::ports::{EventSink, ExpanderBus, LineIo, NativeGpio};

// ───────────────────────────────────────────────────────────────
// Slots
// ───────────────────────────────────────────────────────────────

struct MotorSlot {
    motor: MotorControl,
    travel_ms: u32,
}

impl MotorSlot {
    fn lines(&self) -> [Line; 2] {
        [self.motor.up_relay().line(), self.motor.down_relay().line()]
    }

    fn on_port(&self, id: PortId) -> bool {
        self.lines().iter().any(|l| l.port == PortSel::Expander(id))
    }
}

struct ButtonSlot {
    gesture: ButtonGesture,
    input: Line,
    direction: Direction,
    targets: MotorSet,
    active_low: bool,
}

// ───────────────────────────────────────────────────────────────
// ShutterController
// ───────────────────────────────────────────────────────────────

pub struct ShutterController<B, G> {
    io: IoBank<B, G>,
    motors: Vec<MotorSlot, MAX_MOTORS>,
    buttons: Vec<ButtonSlot, MAX_BUTTONS>,
    /// Direction masks, applied at bring-up.
    directions: Vec<u8, MAX_PORTS>,
    native_outputs: Vec<u8, MAX_NATIVE_OUTPUTS>,
    input_group: Vec<PortId, MAX_PORTS>,
    output_group: Vec<PortId, MAX_PORTS>,
    supervisor: InterlockSupervisor,
    remote_auto_arm: bool,
}

impl<B: ExpanderBus, G: NativeGpio> ShutterController<B, G> {
    /// Build the controller from a wiring description.
    ///
    /// Validates `config` but performs no I/O. Call [`start`](Self::start)
    /// before the first tick.
    pub fn new(config: &SystemConfig, bus: B, native: G) -> Result<Self, Error> {
        config.validate()?;

        let mut io = IoBank::new(bus, native);
        let mut directions = Vec::new();
        let mut input_group = Vec::new();
        let mut output_group = Vec::new();
        for exp in &config.expanders {
            let id = io.add_port(exp.address, exp.write_mode)?;
            let _ = directions.push(exp.direction_mask);
            if exp.direction_mask != 0x00 {
                let _ = input_group.push(id);
            }
            if exp.direction_mask != 0xFF {
                let _ = output_group.push(id);
            }
        }

        let mut motors = Vec::new();
        for (i, m) in config.motors.iter().enumerate() {
            let motor = MotorControl::new(i as u8, Relay::new(m.up), Relay::new(m.down));
            motors
                .push(MotorSlot { motor, travel_ms: m.travel_ms })
                .map_err(|_| ConfigError::CapacityExceeded("motors"))?;
        }

        let mut buttons = Vec::new();
        for (i, b) in config.buttons.iter().enumerate() {
            let slot = ButtonSlot {
                gesture: ButtonGesture::with_thresholds(i as u8, config.short_press_ms, config.long_press_ms),
                input: b.input,
                direction: b.direction,
                targets: b.targets.iter().copied().collect(),
                active_low: b.active_low,
            };
            buttons
                .push(slot)
                .map_err(|_| ConfigError::CapacityExceeded("buttons"))?;
        }

        Ok(Self {
            io,
            motors,
            buttons,
            directions,
            native_outputs: config.native_outputs.clone(),
            input_group,
            output_group,
            supervisor: InterlockSupervisor::new(),
            remote_auto_arm: config.remote_auto_arm,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring-up: drive native relay pins low, set native switch pins to
    /// input, then clear and configure every expander. An expander that
    /// does not answer is latched as a bus fault; the next successful sync
    /// reasserts its configuration.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        for &pin in &self.native_outputs {
            self.io.configure_native_output(pin);
        }
        for slot in &self.buttons {
            if slot.input.port == PortSel::Native {
                self.io.configure_native_input(slot.input.pin);
            }
        }

        for i in 0..self.io.port_count() {
            let id = PortId(i as u8);
            let mask = self.directions.get(i).copied().unwrap_or(0xFF);
            let result = self.io.configure_port(id, mask);
            self.record_bus(id, result, sink);
        }

        sink.emit(&AppEvent::Started {
            motors: self.motors.len() as u8,
            buttons: self.buttons.len() as u8,
        });
        info!(
            "ShutterController started: {} ports, {} motors, {} buttons",
            self.io.port_count(),
            self.motors.len(),
            self.buttons.len()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scheduler cycle at `now_ms`.
    pub fn tick(&mut self, now_ms: u32, commands: &CommandChannel, sink: &mut impl EventSink) {
        let had_faults = self.supervisor.has_faults();

        // 1. Inputs
        self.sync_group(Group::Input, sink);

        // 2. Relay readback
        self.check_interlocks(sink);

        // 3. Buttons
        self.feed_buttons(now_ms, sink);

        // 4. Remote commands
        while let Ok(cmd) = commands.try_receive() {
            self.apply_command(cmd, now_ms, sink);
        }

        // 5. Auto-off timers
        for slot in self.motors.iter_mut() {
            let from = slot.motor.state();
            if slot.motor.tick(now_ms, &mut self.io) {
                sink.emit(&AppEvent::TimerElapsed { motor: slot.motor.id() });
                report_change(&slot.motor, from, sink);
            }
        }

        // 6. Outputs
        self.sync_group(Group::Output, sink);

        if had_faults && !self.supervisor.has_faults() {
            sink.emit(&AppEvent::FaultCleared);
        }
    }

    // ── Remote surface ────────────────────────────────────────

    /// Apply one remote command and report the resulting state.
    pub fn apply_command(&mut self, cmd: RemoteCommand, now_ms: u32, sink: &mut impl EventSink) {
        match cmd {
            RemoteCommand::AllOff => {
                info!("Remote: all off");
                self.all_off(sink);
                sink.emit(&AppEvent::AllOff);
            }
            RemoteCommand::Motor { motor, direction } => {
                let count = self.motors.len() as u8;
                let Some(slot) = self.motors.get_mut(motor as usize) else {
                    warn!("Remote: motor {} out of range", motor);
                    sink.emit(&AppEvent::CommandRejected(CommandError::MotorOutOfRange { motor, count }));
                    return;
                };
                info!("Remote: motor {} {:?}", motor, direction);

                match direction {
                    Direction::Off => stop(slot, &mut self.io, sink),
                    Direction::Up | Direction::Down => {
                        toggle(slot, direction, &mut self.io, &self.supervisor, sink);
                        if self.remote_auto_arm && slot.motor.is_moving() {
                            let travel_ms = slot.travel_ms;
                            arm(slot, travel_ms, now_ms, sink);
                        }
                    }
                }

                sink.emit(&AppEvent::MotorStatus(MotorStatus {
                    motor,
                    state: slot.motor.state(),
                }));
            }
        }
    }

    /// Start or stop `motor`, as a wall press would.
    pub fn toggle(&mut self, motor: u8, direction: Direction, sink: &mut impl EventSink) {
        if let Some(slot) = self.motors.get_mut(motor as usize) {
            toggle(slot, direction, &mut self.io, &self.supervisor, sink);
        }
    }

    pub fn off(&mut self, motor: u8, sink: &mut impl EventSink) {
        if let Some(slot) = self.motors.get_mut(motor as usize) {
            stop(slot, &mut self.io, sink);
        }
    }

    /// Arm `motor`'s auto-off timer. Returns `false` if the motor is off
    /// or does not exist.
    pub fn arm_timer(&mut self, motor: u8, duration_ms: u32, now_ms: u32, sink: &mut impl EventSink) -> bool {
        match self.motors.get_mut(motor as usize) {
            Some(slot) => arm(slot, duration_ms, now_ms, sink),
            None => false,
        }
    }

    pub fn all_off(&mut self, sink: &mut impl EventSink) {
        for slot in self.motors.iter_mut() {
            stop(slot, &mut self.io, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn motor_state(&self, motor: u8) -> Option<Direction> {
        self.motors.get(motor as usize).map(|s| s.motor.state())
    }

    pub fn motor(&self, motor: u8) -> Option<&MotorControl> {
        self.motors.get(motor as usize).map(|s| &s.motor)
    }

    pub fn motor_count(&self) -> usize {
        self.motors.len()
    }

    pub fn supervisor(&self) -> &InterlockSupervisor {
        &self.supervisor
    }

    pub fn io(&self) -> &IoBank<B, G> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoBank<B, G> {
        &mut self.io
    }

    // ── Internal ──────────────────────────────────────────────

    fn sync_group(&mut self, group: Group, sink: &mut impl EventSink) {
        let ports = match group {
            Group::Input => self.input_group.clone(),
            Group::Output => self.output_group.clone(),
        };
        for id in ports {
            let result = self.io.synchronize(id);
            self.record_bus(id, result, sink);
        }
    }

    /// Latch or clear the bus fault of `id`. On failure, every moving
    /// motor with a relay on the port is forced off.
    fn record_bus(&mut self, id: PortId, result: Result<(), BusError>, sink: &mut impl EventSink) {
        let Err(e) = result else {
            self.supervisor.record_bus(id, false);
            return;
        };
        if self.supervisor.record_bus(id, true) {
            sink.emit(&AppEvent::Fault(HardwareFault::Bus(e)));
        }
        for slot in self.motors.iter_mut().filter(|s| s.on_port(id)) {
            if slot.motor.is_moving() {
                warn!("Motor {} forced off: {}", slot.motor.id(), e);
                stop(slot, &mut self.io, sink);
            }
        }
    }

    /// Read back both relays of every motor whose lines are fresh. A
    /// relay fault stays latched until the readback matches the
    /// commanded direction again.
    fn check_interlocks(&mut self, sink: &mut impl EventSink) {
        for slot in self.motors.iter_mut() {
            // Compare only against samples taken after the chip latched
            // the current output bits.
            if !slot.lines().iter().all(|&l| self.io.readback_settled(l)) {
                continue;
            }
            let from = slot.motor.state();
            match slot.motor.check_relays(&mut self.io) {
                Ok(()) => {
                    self.supervisor.record_relay(slot.motor.id(), false);
                }
                Err(fault) => {
                    if self.supervisor.record_relay(slot.motor.id(), true) {
                        sink.emit(&AppEvent::Fault(fault));
                    }
                    report_change(&slot.motor, from, sink);
                }
            }
        }
    }

    fn feed_buttons<S: EventSink>(&mut self, now_ms: u32, sink: &mut S) {
        let Self {
            io,
            motors,
            buttons,
            supervisor,
            ..
        } = self;

        for slot in buttons.iter_mut() {
            // A stale port holds the last good sample; skip rather than
            // classify a frozen level.
            if io.is_stale(slot.input) {
                continue;
            }
            let asserted = io.read_line(slot.input) != slot.active_low;
            let Some(gesture) = slot.gesture.new_value(asserted, now_ms) else {
                continue;
            };

            let button = slot.gesture.id();
            sink.emit(&AppEvent::Gesture { button, gesture });
            let mut binding = Binding {
                io: &mut *io,
                motors: motors.as_mut_slice(),
                supervisor: &*supervisor,
                targets: slot.targets,
                direction: slot.direction,
                now_ms,
                sink: &mut *sink,
            };
            slot.gesture.dispatch(gesture, &mut binding);
        }
    }
}

#[derive(Clone, Copy)]
enum Group {
    Input,
    Output,
}

// ───────────────────────────────────────────────────────────────
// Gesture → motor policy
// ───────────────────────────────────────────────────────────────

/// One button's binding, live for a single dispatch.
///
/// | Gesture       | Effect on every target                         |
/// |---------------|------------------------------------------------|
/// | Press         | toggle in the bound direction                  |
/// | Short release | arm the travel timer if the motor is moving    |
/// | Long hold     | stop                                           |
struct Binding<'a, B, G, S> {
    io: &'a mut IoBank<B, G>,
    motors: &'a mut [MotorSlot],
    supervisor: &'a InterlockSupervisor,
    targets: MotorSet,
    direction: Direction,
    now_ms: u32,
    sink: &'a mut S,
}

impl<B: ExpanderBus, G: NativeGpio, S: EventSink> GestureHandler for Binding<'_, B, G, S> {
    fn on_press(&mut self, _button: u8) {
        let targets = self.targets;
        let direction = self.direction;
        for slot in self.motors.iter_mut().filter(|s| targets.contains(s.motor.id())) {
            toggle(slot, direction, &mut *self.io, self.supervisor, &mut *self.sink);
        }
    }

    fn on_short_release(&mut self, _button: u8) {
        let now_ms = self.now_ms;
        let targets = self.targets;
        for slot in self.motors.iter_mut().filter(|s| targets.contains(s.motor.id())) {
            if slot.motor.is_moving() {
                let travel_ms = slot.travel_ms;
                arm(slot, travel_ms, now_ms, &mut *self.sink);
            }
        }
    }

    fn on_long_hold(&mut self, _button: u8) {
        let targets = self.targets;
        for slot in self.motors.iter_mut().filter(|s| targets.contains(s.motor.id())) {
            stop(slot, &mut *self.io, &mut *self.sink);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Motor actions with event reporting
// ───────────────────────────────────────────────────────────────

fn toggle(
    slot: &mut MotorSlot,
    direction: Direction,
    io: &mut impl LineIo,
    supervisor: &InterlockSupervisor,
    sink: &mut impl EventSink,
) {
    let from = slot.motor.state();
    if from == Direction::Off && direction != Direction::Off && supervisor.blocks(&slot.motor) {
        warn!("Motor {} start refused: fault latched", slot.motor.id());
        return;
    }
    slot.motor.toggle(direction, io);
    report_change(&slot.motor, from, sink);
}

fn stop(slot: &mut MotorSlot, io: &mut impl LineIo, sink: &mut impl EventSink) {
    let from = slot.motor.state();
    slot.motor.off(io);
    report_change(&slot.motor, from, sink);
}

fn arm(slot: &mut MotorSlot, duration_ms: u32, now_ms: u32, sink: &mut impl EventSink) -> bool {
    if !slot.motor.arm_timer(duration_ms, now_ms) {
        return false;
    }
    sink.emit(&AppEvent::TimerArmed {
        motor: slot.motor.id(),
        duration_ms,
    });
    true
}

fn report_change(motor: &MotorControl, from: Direction, sink: &mut impl EventSink) {
    let to = motor.state();
    if from != to {
        sink.emit(&AppEvent::MotorChanged {
            motor: motor.id(),
            from,
            to,
        });
    }
}
