//! Fuzz target for IRC message parsing
//!
//! Feeds arbitrary lines through one long-lived dispatcher so candidate
//! reordering is exercised too. Parsing must never panic, and anything
//! that parses must format to a line that parses again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nebo_irc::{Dispatcher, Message};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };

    let mut dispatcher = Dispatcher::new();
    for line in input.split('\n') {
        if let Ok(message) = dispatcher.parse(line) {
            let _ = message.to_string().parse::<Message>();
        }
    }
});
