//! The inspection pipeline: decode, parse, then render or diagnose.

use std::fmt;

use chrono::{Local, NaiveDate};
use ciborium::Value;
use serde_json::json;

use crate::cbor::parse_cbor_prefix;
use crate::claims::{extract_claims, MdocClaims};
use crate::config::InspectConfig;
use crate::diagnose::Diagnosis;
use crate::error::InspectError;
use crate::payload::{decode_payload, DecodedBytes, PayloadDigest};
use crate::render::{render_with_indent, to_json};

/// Outcome of inspecting one payload.
#[derive(Debug)]
#[non_exhaustive]
pub enum Report {
    /// The bytes held a well-formed CBOR item.
    Parsed(ParsedReport),
    /// The bytes did not parse; a byte-level diagnosis is attached.
    Diagnosed(DiagnosedReport),
    /// The payload was not valid base64, so there are no bytes to look at.
    Undecodable {
        /// Why decoding failed.
        error: InspectError,
    },
}

/// Details of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedReport {
    /// Length and hex prefix of the decoded bytes.
    pub summary: Diagnosis,
    /// SHA-256 of the decoded bytes.
    pub digest: PayloadDigest,
    /// The top-level value.
    pub value: Value,
    /// Indented rendering of `value`.
    pub rendered: String,
    /// Bytes after the top-level item, which were ignored.
    pub trailing: usize,
    /// Identity claims found anywhere in the value.
    pub claims: MdocClaims,
    /// Holder's age in whole years, from the birth date claim.
    pub age: Option<u32>,
    /// Verdict for [`InspectConfig::min_age`], when one was configured.
    pub age_check: Option<AgeCheck>,
}

/// Outcome of checking the claims against a minimum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCheck {
    /// The required age.
    pub min_age: u32,
    /// `None` when neither a birth date nor a covering attestation exists.
    pub met: Option<bool>,
}

impl fmt::Display for AgeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.met {
            Some(true) => "met",
            Some(false) => "not met",
            None => "undetermined",
        };
        write!(f, "minimum age {}: {verdict}", self.min_age)
    }
}

/// Details of a failed parse.
#[derive(Debug)]
pub struct DiagnosedReport {
    /// Byte-level analysis of the input.
    pub diagnosis: Diagnosis,
    /// SHA-256 of the decoded bytes.
    pub digest: PayloadDigest,
    /// The decoder's error.
    pub error: InspectError,
}

impl Report {
    /// Returns `true` if the payload parsed as CBOR.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// The pipeline error, if the report is a fallback.
    #[must_use]
    pub fn error(&self) -> Option<&InspectError> {
        match self {
            Self::Parsed(_) => None,
            Self::Diagnosed(report) => Some(&report.error),
            Self::Undecodable { error } => Some(error),
        }
    }

    /// Machine-readable form of the report.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parsed(report) => json!({
                "status": "parsed",
                "length": report.summary.len,
                "sha256": report.digest.to_string(),
                "hex_prefix": report.summary.prefix_hex,
                "value": to_json(&report.value),
                "trailing_bytes": report.trailing,
                "claims": report.claims,
                "age": report.age,
                "min_age": report.age_check.map(|check| check.min_age),
                "min_age_met": report.age_check.and_then(|check| check.met),
            }),
            Self::Diagnosed(report) => json!({
                "status": "diagnosed",
                "error": report.error.to_string(),
                "length": report.diagnosis.len,
                "sha256": report.digest.to_string(),
                "hex_prefix": report.diagnosis.prefix_hex,
                "first_byte": report.diagnosis.leading.map(|initial| initial.to_string()),
                "classification": report.diagnosis.classification(),
            }),
            Self::Undecodable { error } => json!({
                "status": "undecodable",
                "error": error.to_string(),
            }),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(report) => {
                writeln!(f, "Decoded bytes length: {}", report.summary.len)?;
                writeln!(
                    f,
                    "Hex dump (first {} bytes): {}",
                    report.summary.prefix_limit, report.summary.prefix_hex
                )?;
                writeln!(f, "SHA-256: {}", report.digest)?;
                writeln!(f)?;
                writeln!(f, "Parsed CBOR structure:")?;
                writeln!(f, "{}", report.rendered)?;
                if report.trailing > 0 {
                    writeln!(f, "Trailing bytes ignored: {}", report.trailing)?;
                }
                if !report.claims.is_empty() || report.age_check.is_some() {
                    writeln!(f)?;
                    write!(f, "Claims:\n{}", report.claims)?;
                    if let Some(age) = report.age {
                        writeln!(f, "  age: {age}")?;
                    }
                    if let Some(check) = report.age_check {
                        writeln!(f, "  {check}")?;
                    }
                }
                Ok(())
            }
            Self::Diagnosed(report) => {
                writeln!(f, "Error parsing CBOR: {}", report.error)?;
                writeln!(f)?;
                writeln!(f, "Raw byte analysis:")?;
                writeln!(f, "{}", report.diagnosis)?;
                writeln!(f, "SHA-256: {}", report.digest)
            }
            Self::Undecodable { error } => writeln!(f, "Error decoding payload: {error}"),
        }
    }
}

/// Run the whole pipeline on a textual payload.
///
/// Never fails: decode and parse errors are folded into the report.
#[must_use]
pub fn inspect(payload: &str, config: &InspectConfig) -> Report {
    match decode_payload(payload) {
        Ok(bytes) => inspect_bytes(&bytes, config),
        Err(error) => {
            tracing::warn!(%error, "payload is not valid base64");
            Report::Undecodable { error }
        }
    }
}

/// Run the parse-then-render-or-diagnose half of the pipeline on raw bytes.
///
/// Ages are computed against the local calendar date.
#[must_use]
pub fn inspect_bytes(bytes: &DecodedBytes, config: &InspectConfig) -> Report {
    inspect_bytes_on(bytes, config, Local::now().date_naive())
}

/// [`inspect_bytes`] with ages computed as of `today`.
#[must_use]
pub fn inspect_bytes_on(bytes: &DecodedBytes, config: &InspectConfig, today: NaiveDate) -> Report {
    let summary = Diagnosis::new(bytes, config.hex_prefix_len);
    let digest = bytes.digest();

    match parse_cbor_prefix(bytes) {
        Ok(parsed) => {
            let trailing = parsed.trailing(bytes.len());
            if trailing > 0 {
                tracing::debug!(trailing, "ignoring bytes after top-level item");
            }
            let claims = extract_claims(&parsed.value, config);
            let age = claims.age_on(today);
            let age_check = config
                .min_age
                .map(|min_age| AgeCheck { min_age, met: claims.meets_min_age(min_age, today) });
            let rendered = render_with_indent(&parsed.value, config.indent_width);
            Report::Parsed(ParsedReport {
                summary,
                digest,
                value: parsed.value,
                rendered,
                trailing,
                claims,
                age,
                age_check,
            })
        }
        Err(error) => {
            tracing::warn!(%error, len = bytes.len(), "CBOR parse failed, falling back to byte diagnostics");
            Report::Diagnosed(DiagnosedReport { diagnosis: summary, digest, error })
        }
    }
}
