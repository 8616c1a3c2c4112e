//! Decoding and inspection of base64-wrapped CBOR envelopes.
//!
//! The pipeline is linear: [`decode_payload`] turns URL-safe base64 text
//! into bytes, [`parse_cbor`] reads one CBOR item from them, and the result
//! is either [`render`]ed or, when parsing fails, explained byte by byte by
//! [`diagnose_failure`]. [`inspect`] runs all of it and never fails.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod cbor;
pub mod claims;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod inspect;
pub mod payload;
pub mod render;

pub use cbor::{parse_cbor, parse_cbor_prefix, ParsedPrefix};
pub use ciborium::Value;
pub use claims::{extract_claims, MdocClaims};
pub use config::InspectConfig;
pub use diagnose::{diagnose_failure, Argument, Diagnosis, InitialByte, MajorType};
pub use error::InspectError;
pub use inspect::{inspect, inspect_bytes, inspect_bytes_on, AgeCheck, DiagnosedReport, ParsedReport, Report};
pub use payload::{decode_payload, DecodedBytes, PayloadDigest};
pub use render::{render, render_with_indent, to_json};
