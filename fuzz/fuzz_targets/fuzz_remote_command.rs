//! Fuzz target: `RemoteCommand::parse` + `CommandSender::submit_raw`
//!
//! Splits arbitrary bytes into a topic and a payload and verifies:
//! - No panics under any byte sequence
//! - A parsed `Motor` command carries exactly the decimal payload
//! - The sender never enqueues a motor index at or above the motor count
//!
//! cargo fuzz run fuzz_remote_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use shutterctl::app::channels::{CommandChannel, CommandSender};
use shutterctl::app::commands::RemoteCommand;

const MOTORS: u8 = 8;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let (topic, payload) = text.split_once('\n').unwrap_or((text, ""));

    if let Ok(RemoteCommand::Motor { motor, .. }) = RemoteCommand::parse(topic, payload) {
        assert_eq!(payload.trim().parse::<u8>().ok(), Some(motor));
    }

    let channel = CommandChannel::new();
    let sender = CommandSender::new(&channel, MOTORS);
    let _ = sender.submit_raw(topic, payload);
    while let Ok(cmd) = channel.try_receive() {
        if let Some(motor) = cmd.motor() {
            assert!(motor < MOTORS, "out-of-range motor {motor} reached the queue");
        }
    }
});
