//! Fuzz target: byte-level diagnosis.
//!
//! `diagnose_failure` is the fallback path and must handle any buffer.

#![no_main]

use envelope_core::{diagnose_failure, InitialByte};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = diagnose_failure(data);
    assert!(text.starts_with(&format!("Decoded bytes length: {}", data.len())));

    if let Some(initial) = InitialByte::classify(data) {
        assert_eq!(initial.byte, data[0]);
        assert!(!initial.describe().is_empty());
    }
});
