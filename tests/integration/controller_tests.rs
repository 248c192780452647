//! End-to-end controller behaviour over the default board wiring.
//!
//! Default wiring, for reference:
//!
//! | Button          | Line      | Targets           | Dir  |
//! |-----------------|-----------|-------------------|------|
//! | 2               | MIXED.1   | motor 1           | Up   |
//! | 4               | IN_A.1    | motor 0           | Up   |
//! | 10              | IN_B.6    | motors 0,1,3,6,7  | Up   |
//! | 14 / 15         | IN_B.2/.0 | all motors        | Up / Down |
//!
//! Motors 0/1 are on native pins (up 26/33, down 25/32), motor 3 on
//! MIXED.7/.6, motors 4/5/6 on OUT.1/.0, OUT.3/.2, OUT.4/.5.

use shutterctl::app::channels::CommandSender;
use shutterctl::app::commands::RemoteCommand;
use shutterctl::app::events::{AppEvent, MotorStatus};
use shutterctl::app::ports::NativeGpio;
use shutterctl::config::SystemConfig;
use shutterctl::control::motor::Direction;
use shutterctl::drivers::button::GestureEvent;
use shutterctl::drivers::port::WriteMode;
use shutterctl::error::{BusError, BusOp, CommandError, HardwareFault};

use super::mock_hw::*;

fn remote(rig: &Rig, topic: &str, payload: &str) -> Result<(), CommandError> {
    CommandSender::new(&rig.commands, rig.ctl.motor_count() as u8).submit_raw(topic, payload)
}

fn state(rig: &Rig, motor: u8) -> Direction {
    rig.ctl.motor_state(motor).expect("motor exists")
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn start_configures_every_port_and_drives_relays_low() {
    let rig = Rig::new();

    assert_eq!(rig.sink.events[0], AppEvent::Started { motors: 8, buttons: 20 });
    assert_eq!(rig.bus().chip(OUT).config, 0x00);
    assert_eq!(rig.bus().chip(MIXED).config, 0x0F);
    assert_eq!(rig.bus().chip(IN_A).config, 0xFF);
    assert_eq!(rig.bus().chip(IN_B).config, 0xFF);
    assert_eq!(rig.bus().chip(OUT).output, 0x00);
    assert_eq!(rig.bus().chip(MIXED).output, 0x00);

    for pin in [25, 26, 32, 33] {
        assert!(rig.gpio().outputs.contains(&pin));
        assert_eq!(rig.gpio().levels.get(&pin), Some(&false));
    }
    assert!(!rig.ctl.supervisor().has_faults());
}

#[test]
fn dead_expander_at_start_is_reported_and_reconfigured_on_recovery() {
    let mut bus = MockBus::with_chips(&[OUT, MIXED, IN_A, IN_B]);
    bus.set_failing(MIXED, true);
    let mut rig = Rig::with_bus(&SystemConfig::default(), bus);

    assert!(rig.sink.contains(&AppEvent::Fault(HardwareFault::Bus(BusError {
        address: MIXED,
        op: BusOp::WriteOutput,
    }))));

    rig.bus_mut().set_failing(MIXED, false);
    rig.tick();
    assert_eq!(rig.bus().chip(MIXED).config, 0x0F);
    assert_eq!(rig.bus().chip(MIXED).output, 0x00);
    assert!(rig.sink.contains(&AppEvent::FaultCleared));
}

// ── Wall switches ─────────────────────────────────────────────

#[test]
fn short_press_starts_motor_and_arms_travel_timer() {
    let mut rig = Rig::new();
    rig.short_press(IN_A, 1);

    assert_eq!(state(&rig, 0), Direction::Up);
    assert!(rig.gpio().level(26));
    assert!(!rig.gpio().level(25));
    assert!(rig.sink.contains(&AppEvent::Gesture { button: 4, gesture: GestureEvent::Press }));
    assert!(rig.sink.contains(&AppEvent::Gesture { button: 4, gesture: GestureEvent::ShortRelease }));
    assert!(rig.sink.contains(&AppEvent::TimerArmed { motor: 0, duration_ms: 37_000 }));

    rig.run_for(36_990);
    assert_eq!(state(&rig, 0), Direction::Up);
    rig.tick();
    assert_eq!(state(&rig, 0), Direction::Off);
    assert!(!rig.gpio().level(26));
    assert!(rig.sink.contains(&AppEvent::TimerElapsed { motor: 0 }));
}

#[test]
fn long_hold_stops_motor_without_timer() {
    let mut rig = Rig::new();
    rig.long_press(MIXED, 1);

    assert_eq!(state(&rig, 1), Direction::Off);
    assert!(!rig.gpio().level(33));
    assert!(rig.sink.contains(&AppEvent::MotorChanged { motor: 1, from: Direction::Off, to: Direction::Up }));
    assert!(rig.sink.contains(&AppEvent::MotorChanged { motor: 1, from: Direction::Up, to: Direction::Off }));
    assert!(rig.sink.contains(&AppEvent::Gesture { button: 2, gesture: GestureEvent::LongHold }));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TimerArmed { .. })), 0);
}

#[test]
fn bounce_shorter_than_press_threshold_does_nothing() {
    let mut rig = Rig::new();
    rig.hold(IN_A, 1, 50);
    assert_eq!(state(&rig, 0), Direction::Off);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Gesture { .. })), 0);
}

#[test]
fn second_press_stops_a_moving_motor() {
    let mut rig = Rig::new();
    rig.short_press(IN_A, 1);
    assert_eq!(state(&rig, 0), Direction::Up);

    // Down button of the same shutter: stop, not reverse.
    rig.short_press(IN_A, 3);
    assert_eq!(state(&rig, 0), Direction::Off);
    assert!(!rig.gpio().level(25));
    assert!(!rig.ctl.motor(0).unwrap().timer_armed());
}

#[test]
fn group_button_fans_out_to_living_room() {
    let mut rig = Rig::new();
    rig.short_press(IN_B, 6);

    for m in [0, 1, 3, 6, 7] {
        assert_eq!(state(&rig, m), Direction::Up, "motor {m}");
    }
    for m in [2, 4, 5] {
        assert_eq!(state(&rig, m), Direction::Off, "motor {m}");
    }
    assert!(rig.bus().output_level(MIXED, 7));
    assert!(!rig.bus().output_level(MIXED, 6));
    assert!(rig.bus().output_level(OUT, 4));
    assert!(!rig.bus().output_level(OUT, 5));
    assert!(rig.sink.contains(&AppEvent::TimerArmed { motor: 6, duration_ms: 73_000 }));
    assert!(rig.sink.contains(&AppEvent::TimerArmed { motor: 3, duration_ms: 33_000 }));
}

#[test]
fn whole_house_buttons_start_and_stop_everything() {
    let mut rig = Rig::new();
    rig.short_press(IN_B, 2);
    for m in 0..8 {
        assert_eq!(state(&rig, m), Direction::Up, "motor {m}");
    }

    rig.short_press(IN_B, 0);
    for m in 0..8 {
        assert_eq!(state(&rig, m), Direction::Off, "motor {m}");
        assert!(!rig.ctl.motor(m).unwrap().timer_armed());
    }
    assert_eq!(rig.bus().chip(OUT).output, 0x00);
}

#[test]
fn active_low_switch_reads_inverted() {
    let mut config = SystemConfig::default();
    config.buttons[4].active_low = true;
    let mut rig = Rig::with_config(&config);

    // Idle line is low: reads as held.
    rig.run_for(200);
    assert_eq!(state(&rig, 0), Direction::Up);

    rig.bus_mut().set_external(IN_A, 1, true);
    rig.tick();
    assert!(rig.ctl.motor(0).unwrap().timer_armed());
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_start_arms_timer_and_reports_status() {
    let mut rig = Rig::new();
    remote(&rig, "cmnd/shutter/down", "5").unwrap();
    rig.tick();

    assert_eq!(state(&rig, 5), Direction::Down);
    assert!(rig.bus().output_level(OUT, 2));
    assert!(!rig.bus().output_level(OUT, 3));
    assert!(rig.sink.contains(&AppEvent::TimerArmed { motor: 5, duration_ms: 33_000 }));
    let status = MotorStatus { motor: 5, state: Direction::Down };
    assert!(rig.sink.contains(&AppEvent::MotorStatus(status)));
    assert_eq!(status.to_string(), "{5}↓");

    rig.run_for(32_990);
    assert_eq!(state(&rig, 5), Direction::Down);
    rig.tick();
    assert_eq!(state(&rig, 5), Direction::Off);
}

#[test]
fn remote_toggle_on_moving_motor_stops_it() {
    let mut rig = Rig::new();
    remote(&rig, "up", "2").unwrap();
    rig.tick();
    remote(&rig, "up", "2").unwrap();
    rig.tick();

    assert_eq!(state(&rig, 2), Direction::Off);
    assert!(rig.sink.contains(&AppEvent::MotorStatus(MotorStatus { motor: 2, state: Direction::Off })));
    assert!(!rig.ctl.motor(2).unwrap().timer_armed());
}

#[test]
fn remote_commands_apply_in_arrival_order() {
    let mut rig = Rig::new();
    remote(&rig, "up", "4").unwrap();
    remote(&rig, "off", "4").unwrap();
    remote(&rig, "down", "5").unwrap();
    rig.tick();

    assert_eq!(state(&rig, 4), Direction::Off);
    assert_eq!(state(&rig, 5), Direction::Down);
}

#[test]
fn remote_off_without_index_stops_all() {
    let mut rig = Rig::new();
    remote(&rig, "up", "1").unwrap();
    remote(&rig, "down", "6").unwrap();
    rig.tick();
    assert!(rig.ctl.motor(1).unwrap().is_moving());

    remote(&rig, "cmnd/shutter/off", "").unwrap();
    rig.tick();
    for m in 0..8 {
        assert_eq!(state(&rig, m), Direction::Off);
    }
    assert!(rig.sink.contains(&AppEvent::AllOff));
}

#[test]
fn out_of_range_motor_rejected_before_the_core() {
    let mut rig = Rig::new();
    assert_eq!(
        remote(&rig, "up", "9"),
        Err(CommandError::MotorOutOfRange { motor: 9, count: 8 })
    );

    let mut sink = RecordingSink::default();
    rig.ctl.apply_command(
        RemoteCommand::Motor { motor: 9, direction: Direction::Up },
        rig.now,
        &mut sink,
    );
    assert_eq!(
        sink.events,
        vec![AppEvent::CommandRejected(CommandError::MotorOutOfRange { motor: 9, count: 8 })]
    );
}

#[test]
fn remote_auto_arm_can_be_disabled() {
    let config = SystemConfig {
        remote_auto_arm: false,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(&config);
    remote(&rig, "up", "3").unwrap();
    rig.tick();

    assert_eq!(state(&rig, 3), Direction::Up);
    assert!(!rig.ctl.motor(3).unwrap().timer_armed());
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn welded_expander_relay_forces_motor_off_and_reports_once() {
    let mut rig = Rig::new();
    remote(&rig, "down", "4").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 4), Direction::Down);

    // Up contact of motor 4 welded closed.
    rig.bus_mut().chip_mut(OUT).stuck_high = 1 << 1;
    rig.run_for(100);

    assert_eq!(state(&rig, 4), Direction::Off);
    assert!(!rig.bus().output_level(OUT, 0));
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::Fault(HardwareFault::BothRelaysEnergized { motor: 4 })),
        1
    );
    assert!(rig.sink.contains(&AppEvent::MotorChanged {
        motor: 4,
        from: Direction::Down,
        to: Direction::Off
    }));
}

#[test]
fn welded_relay_keeps_its_motor_blocked_until_repaired() {
    let mut rig = Rig::new();
    remote(&rig, "down", "4").unwrap();
    rig.tick();
    rig.bus_mut().chip_mut(OUT).stuck_high = 1 << 1;
    rig.run_for(60);
    assert_eq!(state(&rig, 4), Direction::Off);

    // The weld is still there: the fault stays latched and a restart
    // against it is refused.
    rig.run_for(200);
    assert_eq!(rig.ctl.supervisor().relay_faults(), 1 << 4);
    assert!(!rig.sink.contains(&AppEvent::FaultCleared));

    remote(&rig, "down", "4").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 4), Direction::Off);
    assert!(!rig.bus().output_level(OUT, 0));
    assert_ne!(rig.bus().chip(OUT).input_register() & 0b11, 0b11);

    // Other motors on the same expander keep working.
    remote(&rig, "down", "5").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 5), Direction::Down);

    rig.bus_mut().chip_mut(OUT).stuck_high = 0;
    rig.run_for(30);
    assert_eq!(rig.ctl.supervisor().relay_faults(), 0);
    assert!(rig.sink.contains(&AppEvent::FaultCleared));

    remote(&rig, "down", "4").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 4), Direction::Down);
}

#[test]
fn welded_native_relay_detected_on_next_tick() {
    let mut rig = Rig::new();
    remote(&rig, "down", "0").unwrap();
    rig.tick();

    rig.gpio_mut().stuck_high.insert(26);
    rig.tick();

    assert_eq!(state(&rig, 0), Direction::Off);
    assert!(rig.sink.contains(&AppEvent::Fault(HardwareFault::BothRelaysEnergized { motor: 0 })));
}

#[test]
fn bus_failure_forces_motors_off_and_blocks_restart_until_recovery() {
    let mut rig = Rig::new();
    remote(&rig, "up", "3").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 3), Direction::Up);

    rig.bus_mut().set_failing(MIXED, true);
    rig.run_for(50);

    assert_eq!(state(&rig, 3), Direction::Off);
    let fault = AppEvent::Fault(HardwareFault::Bus(BusError { address: MIXED, op: BusOp::ReadInput }));
    assert_eq!(rig.sink.count(|e| *e == fault), 1);
    assert!(rig.ctl.supervisor().has_faults());

    remote(&rig, "up", "3").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 3), Direction::Off, "start refused while the port is down");

    // Motors on healthy ports keep working.
    remote(&rig, "up", "4").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 4), Direction::Up);

    rig.bus_mut().set_failing(MIXED, false);
    rig.tick();
    assert!(!rig.bus().output_level(MIXED, 7));
    assert!(rig.sink.contains(&AppEvent::FaultCleared));

    remote(&rig, "up", "3").unwrap();
    rig.tick();
    assert_eq!(state(&rig, 3), Direction::Up);
}

#[test]
fn switches_on_a_failed_port_are_ignored() {
    let mut rig = Rig::new();
    rig.bus_mut().set_failing(MIXED, true);
    rig.short_press(MIXED, 1);

    assert_eq!(state(&rig, 1), Direction::Off);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Gesture { button: 2, .. })), 0);
}

// ── Bus traffic ───────────────────────────────────────────────

#[test]
fn idle_tick_syncs_each_port_once_per_group() {
    let mut rig = Rig::new();
    rig.bus_mut().reset_counters();
    rig.tick();

    // IN_A / IN_B: input group only. OUT: output group only. MIXED: both.
    for (addr, syncs) in [(IN_A, 1), (IN_B, 1), (OUT, 1), (MIXED, 2)] {
        let chip = rig.bus().chip(addr);
        assert_eq!(chip.input_reads, syncs, "reads on 0x{addr:02x}");
        assert_eq!(chip.output_writes, syncs, "output writes on 0x{addr:02x}");
        assert_eq!(chip.config_writes, syncs, "config writes on 0x{addr:02x}");
    }
}

#[test]
fn deferred_port_lands_a_whole_tick_in_one_write() {
    let mut config = SystemConfig::default();
    config.expanders[0].write_mode = WriteMode::Deferred;
    let mut rig = Rig::with_config(&config);

    remote(&rig, "down", "4").unwrap();
    remote(&rig, "up", "6").unwrap();
    rig.bus_mut().reset_counters();
    rig.tick();

    assert_eq!(rig.bus().chip(OUT).output_writes, 1);
    assert_eq!(rig.bus().chip(OUT).output, 0b0001_0001);
}

#[test]
fn write_through_port_shows_break_before_make() {
    let mut rig = Rig::new();
    remote(&rig, "down", "4").unwrap();
    rig.bus_mut().reset_counters();
    rig.tick();

    // down-off, up-off, down-on, then the end-of-tick sync.
    assert_eq!(rig.bus().chip(OUT).output_writes, 4);
    assert!(rig.bus().output_level(OUT, 0));
}

// ── Alternative wiring ────────────────────────────────────────

#[test]
fn json_wiring_drives_a_single_expander_board() {
    let json = r#"{
        "expanders": [{ "address": 32, "direction_mask": 240 }],
        "motors": [{
            "up":   { "port": { "Expander": 0 }, "pin": 1 },
            "down": { "port": { "Expander": 0 }, "pin": 0 },
            "travel_ms": 5000
        }],
        "buttons": [
            { "input": { "port": { "Expander": 0 }, "pin": 4 }, "direction": "Up",   "targets": [0] },
            { "input": { "port": { "Expander": 0 }, "pin": 5 }, "direction": "Down", "targets": [0] }
        ]
    }"#;
    let config = SystemConfig::from_json(json).unwrap();
    let mut rig = Rig::with_bus(&config, MockBus::with_chips(&[0x20]));

    rig.short_press(0x20, 4);
    assert_eq!(state(&rig, 0), Direction::Up);
    assert!(rig.bus().output_level(0x20, 1));

    rig.run_for(5_000);
    assert_eq!(state(&rig, 0), Direction::Off);
    assert_eq!(rig.bus().chip(0x20).output & 0x0F, 0);
}
