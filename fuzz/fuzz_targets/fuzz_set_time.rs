//! Fuzz target: `parse_day_time`
//!
//! Arbitrary UTF-8 payloads must either parse into in-range fields or be
//! rejected with a typed error.
//!
//! cargo fuzz run fuzz_set_time

#![no_main]

use libfuzzer_sys::fuzz_target;
use roombridge::app::commands::{MAX_HOUR, MAX_MINUTE, parse_day_time};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(dt) = parse_day_time(payload) {
        assert!(dt.hour <= MAX_HOUR);
        assert!(dt.minute <= MAX_MINUTE);
        assert!(dt.day.code() < 7);
    }
});
