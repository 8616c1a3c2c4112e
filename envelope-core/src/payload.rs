//! Base64 payload decoding and the byte-level types it produces.

use std::fmt::{self, Write as _};
use std::ops::Deref;

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::InspectError;

/// URL-safe engine that tolerates non-zero spare bits in the final symbol,
/// matching lenient decoders such as Python's `urlsafe_b64decode`.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Bytes recovered from a base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedBytes(Vec<u8>);

impl DecodedBytes {
    /// Wraps raw bytes, e.g. when inspecting a buffer that never was base64.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the wrapper and returns the inner buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// SHA-256 over the decoded bytes.
    #[must_use]
    pub fn digest(&self) -> PayloadDigest {
        PayloadDigest::of(&self.0)
    }
}

impl Deref for DecodedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

/// A SHA-256 digest of a decoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct PayloadDigest(pub [u8; 32]);

impl PayloadDigest {
    /// Hashes `bytes`.
    ///
    /// # Complexity
    /// O(n) in the input length.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PayloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Decode a URL-safe base64 payload that may be missing its `=` padding.
///
/// `(4 - len % 4) % 4` padding characters are appended before decoding.
/// Spare bits in the final symbol are ignored rather than rejected.
/// The standard-alphabet symbols `+` and `/` are accepted as aliases of
/// `-` and `_`, since wallets are not consistent about which one they emit.
///
/// # Errors
/// Returns [`InspectError::Format`] if the payload is empty, contains a
/// character outside the base64 alphabet, or cannot be padded into whole
/// 4-character groups.
pub fn decode_payload(payload: &str) -> Result<DecodedBytes, InspectError> {
    if payload.is_empty() {
        return Err(InspectError::format("payload is empty"));
    }

    let mut normalized = String::with_capacity(payload.len() + 3);
    for (index, ch) in payload.chars().enumerate() {
        let mapped = match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '=' => ch,
            '+' => '-',
            '/' => '_',
            other => {
                return Err(InspectError::format(format!(
                    "character {other:?} at position {index} is outside the URL-safe alphabet"
                )));
            }
        };
        normalized.push(mapped);
    }

    let padding = (4 - normalized.len() % 4) % 4;
    if padding == 3 {
        return Err(InspectError::format(format!(
            "length {} cannot be padded to a multiple of 4",
            normalized.len()
        )));
    }
    normalized.extend(std::iter::repeat('=').take(padding));

    let bytes = LENIENT_URL_SAFE
        .decode(&normalized)
        .map_err(|e| InspectError::format(e.to_string()))?;

    tracing::debug!(chars = payload.len(), padding, len = bytes.len(), "decoded payload");
    Ok(DecodedBytes(bytes))
}

/// Lowercase hex without separators.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}
