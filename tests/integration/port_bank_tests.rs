//! Port arena and relay behaviour against the simulated expander bus.

use shutterctl::app::ports::LineIo;
use shutterctl::control::motor::{Direction, MotorControl};
use shutterctl::drivers::io_bank::IoBank;
use shutterctl::drivers::port::{Line, PortId, WriteMode};
use shutterctl::drivers::relay::Relay;

use super::mock_hw::{MIXED, MockBus, MockGpio, OUT};

fn bank() -> IoBank<MockBus, MockGpio> {
    let mut bank = IoBank::new(MockBus::with_chips(&[OUT, MIXED]), MockGpio::default());
    let out = bank.add_port(OUT, WriteMode::WriteThrough).unwrap();
    let mixed = bank.add_port(MIXED, WriteMode::WriteThrough).unwrap();
    bank.configure_port(out, 0x00).unwrap();
    bank.configure_port(mixed, 0x0F).unwrap();
    bank
}

#[test]
fn port_ids_follow_registration_order() {
    let bank = bank();
    assert_eq!(bank.port_count(), 2);
    assert_eq!(bank.port(PortId(0)).unwrap().address(), OUT);
    assert_eq!(bank.port(PortId(1)).unwrap().address(), MIXED);
    assert!(bank.port(PortId(2)).is_none());
}

#[test]
fn relay_writes_land_on_their_own_expander() {
    let mut bank = bank();
    let relay = Relay::new(Line::expander(1, 5));
    relay.on(&mut bank);

    assert!(bank.bus().output_level(MIXED, 5));
    assert_eq!(bank.bus().chip(OUT).output, 0x00);

    // Readback comes from the cache, refreshed by the next sync.
    assert!(!relay.get(&bank));
    bank.synchronize(PortId(1)).unwrap();
    assert!(relay.get(&bank));

    relay.off(&mut bank);
    assert!(!bank.bus().output_level(MIXED, 5));
}

#[test]
fn native_lines_bypass_the_cache() {
    let mut bank = bank();
    bank.configure_native_output(26);
    let relay = Relay::new(Line::native(26));

    relay.on(&mut bank);
    assert!(relay.get(&bank));
    assert_eq!(bank.native().levels.get(&26), Some(&true));
}

#[test]
fn switch_levels_visible_only_after_sync() {
    let mut bank = bank();
    let switch = Line::expander(1, 2);

    bank.bus_mut().set_external(MIXED, 2, true);
    assert!(!bank.read_line(switch));
    bank.synchronize(PortId(1)).unwrap();
    assert!(bank.read_line(switch));
}

#[test]
fn stale_flag_tracks_failed_reads() {
    let mut bank = bank();
    let switch = Line::expander(1, 0);

    bank.bus_mut().set_failing(MIXED, true);
    assert!(bank.synchronize(PortId(1)).is_err());
    assert!(bank.is_stale(switch));
    assert!(!bank.is_stale(Line::expander(0, 0)));
    assert!(!bank.is_stale(Line::native(26)));

    bank.bus_mut().set_failing(MIXED, false);
    bank.synchronize(PortId(1)).unwrap();
    assert!(!bank.is_stale(switch));
}

#[test]
fn motor_on_mixed_port_never_energizes_both_lines() {
    let mut bank = bank();
    let mut motor = MotorControl::new(
        3,
        Relay::new(Line::expander(1, 7)),
        Relay::new(Line::expander(1, 6)),
    );

    for dir in [Direction::Up, Direction::Down, Direction::Up, Direction::Down] {
        motor.set(dir, &mut bank);
        let out = bank.bus().chip(MIXED).output;
        assert_ne!(out & 0b1100_0000, 0b1100_0000, "both relays on after {dir:?}");
    }
}
