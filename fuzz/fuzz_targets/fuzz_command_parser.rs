//! Fuzz target: operator command grammar
//!
//! Any UTF-8 line must parse or fail cleanly; accepted integer settings
//! never come from text with a leading sign.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermoguard::app::commands::{Command, SettingUpdate, parse_command};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(Command::Set(SettingUpdate::MinSamples(_) | SettingUpdate::RenotifySeconds(_))) =
        parse_command(text)
    {
        assert!(!text.contains('-'), "negative integer accepted: {text:?}");
    }
});
