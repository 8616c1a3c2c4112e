//! Fuzz target: CBOR parsing and rendering of arbitrary bytes.
//!
//! Malformed input must surface as an error, never a panic, and anything
//! that parses must render and extract claims without panicking.

#![no_main]

use envelope_core::{extract_claims, parse_cbor_prefix, render, to_json, InspectConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(parsed) = parse_cbor_prefix(data) else {
        return;
    };
    assert!(parsed.consumed <= data.len());

    let _ = render(&parsed.value);
    let _ = to_json(&parsed.value);
    let _ = extract_claims(&parsed.value, &InspectConfig::default());
});
