//! Fuzz target: base64 payload decoding and the full text pipeline.
//!
//! Arbitrary UTF-8 goes through `decode_payload` and `inspect`. Neither may
//! panic, and `inspect` must always produce a printable report.

#![no_main]

use envelope_core::{decode_payload, inspect, InspectConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(bytes) = decode_payload(text) {
        // Every 4 characters carry at most 3 bytes.
        assert!(bytes.len() <= text.len() * 3 / 4 + 2);
    }

    let report = inspect(text, &InspectConfig::default());
    let _ = report.to_string();
    let _ = report.to_json();
});
