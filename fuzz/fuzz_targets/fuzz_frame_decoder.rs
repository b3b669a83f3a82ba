//! Fuzz target: `decode_frame`
//!
//! Drives arbitrary byte sequences into the sensor frame decoder and
//! asserts that it never panics, accepts exactly the frame length, and
//! gives the same answer twice.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use roombridge::protocol::{FRAME_LEN, decode_frame};

fuzz_target!(|data: &[u8]| {
    let decoded = decode_frame(data);
    assert_eq!(decoded.is_ok(), data.len() == FRAME_LEN);
    assert_eq!(decoded, decode_frame(data));

    if let Ok(frame) = decoded {
        // Percent and vote helpers must be total over every field value.
        let _ = roombridge::telemetry::percent_remaining(frame.charge_mah, frame.capacity_mah);
        let _ = frame.moving_forward();
    }
});
