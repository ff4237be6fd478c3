//! Fuzz target for channel and user mode decoding.
//!
//! The first line is loaded as ISUPPORT tokens, the second is the mode
//! string and the rest are its arguments.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nebo_irc::{parse_channel_modes, parse_user_modes, serialize_modes, ServerSupport};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    let mut lines = input.split('\n');
    let (Some(tokens), Some(modes)) = (lines.next(), lines.next()) else {
        return;
    };
    let args: Vec<&str> = lines.collect();

    let mut support = ServerSupport::default();
    support.load(tokens.split(' ').map(|t| match t.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (t, None),
    }));

    if let Ok(parsed) = parse_channel_modes(modes, &args, &support) {
        let (letters, args) = serialize_modes(&parsed);
        let _ = parse_channel_modes(&letters, &args, &support);
    }
    let _ = parse_user_modes(modes, &args);
});
