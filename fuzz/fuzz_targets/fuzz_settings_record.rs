//! Fuzz target: persisted settings record
//!
//! Feeds arbitrary bytes to the record decoder and checks:
//! - No panics, whatever the length or content
//! - Anything accepted passes the settings predicate
//! - Re-encoding an accepted record decodes to the same settings
//!
//! cargo fuzz run fuzz_settings_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermoguard::protection::store::{decode, encode};

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = decode(data) {
        assert!(settings.validate().is_ok(), "decoder accepted invalid settings");
        assert_eq!(decode(&encode(&settings)), Ok(settings));
    }
});
