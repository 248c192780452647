//! Shutterctl Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative scheduler loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  I2cExpanderBus    BoardGpio      LogEventSink   BoardClock    │
//! │  (ExpanderBus)     (NativeGpio)   (EventSink)    (Clock)       │
//! │  Console reader ──▶ REMOTE_COMMANDS                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ShutterController (pure logic)                │    │
//! │  │  ports · buttons · motors · interlock                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use shutterctl::adapters::hardware::BoardGpio;
use shutterctl::adapters::log_sink::LogEventSink;
use shutterctl::adapters::time::BoardClock;
use shutterctl::app::channels::{CommandSender, REMOTE_COMMANDS};
use shutterctl::app::ports::Clock;
use shutterctl::app::service::ShutterController;
use shutterctl::config::SystemConfig;
use shutterctl::drivers::pca9534::I2cExpanderBus;
use shutterctl::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Shutterctl v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Expander bus ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;
    info!(
        "I2C up: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );

    // ── 3. Controller ─────────────────────────────────────────
    let config = SystemConfig::default();
    let mut controller = ShutterController::new(&config, I2cExpanderBus::new(i2c), BoardGpio::new())?;
    let mut sink = LogEventSink::new();
    controller.start(&mut sink);

    // ── 4. Remote command source ──────────────────────────────
    //
    // Console lines of the form `<direction|topic> [motor]`, e.g.
    // `up 3` or `cmnd/shutter/off`.
    let sender = CommandSender::new(&REMOTE_COMMANDS, controller.motor_count() as u8);
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (topic, payload) = line.split_once(' ').unwrap_or((line, ""));
                if let Err(e) = sender.submit_raw(topic, payload) {
                    warn!("console: {}", e);
                }
            }
        })?;

    // ── 5. Scheduler loop ─────────────────────────────────────
    let clock = BoardClock::new();
    info!("Entering control loop ({} ms)", config.loop_interval_ms);
    loop {
        controller.tick(clock.now_ms(), &REMOTE_COMMANDS, &mut sink);
        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
