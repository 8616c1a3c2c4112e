//! Identity claims extracted from decoded mdoc structures.
//!
//! An ISO 18013-5 issuer-signed item is a map carrying `digestID`,
//! `random`, `elementIdentifier` and `elementValue`. Wallets wrap these in
//! several layers (tag 24 byte strings, base64 text inside namespace
//! arrays), so the walker follows embedded CBOR up to a configured depth.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use ciborium::Value;
use serde::Serialize;

use crate::cbor::parse_cbor;
use crate::config::InspectConfig;
use crate::payload::decode_payload;

/// Tag number for "encoded CBOR data item".
pub const TAG_EMBEDDED_CBOR: u64 = 24;

const ELEMENT_IDENTIFIER: &str = "elementIdentifier";
const ELEMENT_VALUE: &str = "elementValue";
const DOC_TYPE: &str = "docType";

/// The claims an age or identity check cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct MdocClaims {
    /// Document type, e.g. `org.iso.18013.5.1.mDL`.
    pub doc_type: Option<String>,
    /// Birth date as presented, usually `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Issuer attestation that the holder is at least 18.
    pub age_over_18: Option<bool>,
    /// Issuer attestation that the holder is at least 21.
    pub age_over_21: Option<bool>,
}

impl MdocClaims {
    /// Returns `true` if no claim was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The birth date parsed as an ISO calendar date.
    #[must_use]
    pub fn birth_date_parsed(&self) -> Option<NaiveDate> {
        let raw = self.birth_date.as_deref()?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
    }

    /// Whole years between the birth date and `today`.
    ///
    /// Returns `None` without a parsable birth date, or when the birth date
    /// lies after `today`.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.birth_date_parsed()?;
        if born > today {
            return None;
        }
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Whether the holder has reached `min_age` on `today`.
    ///
    /// The birth date decides when it parses. Otherwise the issuer's
    /// `age_over_18`/`age_over_21` attestations decide if one of them
    /// covers the threshold. `None` means the claims cannot tell.
    #[must_use]
    pub fn meets_min_age(&self, min_age: u32, today: NaiveDate) -> Option<bool> {
        if let Some(age) = self.age_on(today) {
            return Some(age >= min_age);
        }
        for (threshold, attested) in [(18, self.age_over_18), (21, self.age_over_21)] {
            match attested {
                Some(true) if threshold >= min_age => return Some(true),
                Some(false) if threshold <= min_age => return Some(false),
                _ => {}
            }
        }
        None
    }

    fn record(&mut self, kind: ClaimKind, value: &Value) {
        let value = untag(value);
        match (kind, value) {
            (ClaimKind::BirthDate, Value::Text(text)) if !text.is_empty() => {
                self.birth_date = Some(text.clone());
            }
            (ClaimKind::GivenName, Value::Text(text)) => self.given_name = Some(text.clone()),
            (ClaimKind::FamilyName, Value::Text(text)) => self.family_name = Some(text.clone()),
            (ClaimKind::AgeOver18, Value::Bool(flag)) => self.age_over_18 = Some(*flag),
            (ClaimKind::AgeOver21, Value::Bool(flag)) => self.age_over_21 = Some(*flag),
            (kind, other) => {
                tracing::debug!(?kind, value = ?other, "claim value has unexpected type");
            }
        }
    }
}

impl fmt::Display for MdocClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text_fields = [
            ("docType", &self.doc_type),
            ("birth_date", &self.birth_date),
            ("given_name", &self.given_name),
            ("family_name", &self.family_name),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value {
                writeln!(f, "  {name}: {value}")?;
            }
        }
        for (name, value) in [("age_over_18", self.age_over_18), ("age_over_21", self.age_over_21)] {
            if let Some(value) = value {
                writeln!(f, "  {name}: {value}")?;
            }
        }
        Ok(())
    }
}

/// Claim identifiers recognised by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimKind {
    BirthDate,
    GivenName,
    FamilyName,
    AgeOver18,
    AgeOver21,
}

impl ClaimKind {
    fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.to_ascii_lowercase().as_str() {
            "birth_date" | "birthdate" | "date_of_birth" | "dob" => Some(Self::BirthDate),
            "given_name" | "givenname" | "first_name" | "firstname" => Some(Self::GivenName),
            "family_name" | "familyname" | "last_name" | "lastname" => Some(Self::FamilyName),
            "age_over_18" | "ageover18" | "over_18" | "is_over_18" => Some(Self::AgeOver18),
            "age_over_21" | "ageover21" | "over_21" | "is_over_21" => Some(Self::AgeOver21),
            _ => None,
        }
    }
}

/// Walk `value` and collect every recognised claim.
///
/// Later occurrences of a claim overwrite earlier ones; `docType` keeps the
/// first one seen.
#[must_use]
pub fn extract_claims(value: &Value, config: &InspectConfig) -> MdocClaims {
    let mut walker = ClaimWalker { max_depth: config.max_embedded_depth, claims: MdocClaims::default() };
    walker.visit(value, 0);
    walker.claims
}

struct ClaimWalker {
    max_depth: u8,
    claims: MdocClaims,
}

impl ClaimWalker {
    fn visit(&mut self, value: &Value, depth: u8) {
        match value {
            Value::Map(entries) => self.visit_map(entries, depth),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Text(text) => self.visit_base64(text, depth),
                        other => self.visit(other, depth),
                    }
                }
            }
            Value::Tag(TAG_EMBEDDED_CBOR, inner) => match inner.as_ref() {
                Value::Bytes(bytes) => self.visit_embedded(bytes, depth),
                other => self.visit(other, depth),
            },
            Value::Tag(_, inner) => self.visit(inner, depth),
            Value::Bytes(bytes) => self.visit_embedded(bytes, depth),
            _ => {}
        }
    }

    fn visit_map(&mut self, entries: &[(Value, Value)], depth: u8) {
        if let (Some(Value::Text(identifier)), Some(element)) =
            (lookup(entries, ELEMENT_IDENTIFIER).map(untag), lookup(entries, ELEMENT_VALUE))
        {
            match ClaimKind::from_identifier(identifier) {
                Some(kind) => self.claims.record(kind, element),
                None => tracing::debug!(%identifier, "unknown claim identifier"),
            }
        }

        for (key, val) in entries {
            let Value::Text(key) = key else { continue };
            if key == DOC_TYPE {
                if let (true, Value::Text(doc_type)) = (self.claims.doc_type.is_none(), untag(val)) {
                    self.claims.doc_type = Some(doc_type.clone());
                }
            } else if let Some(kind) = ClaimKind::from_identifier(key) {
                self.claims.record(kind, val);
            }
        }

        for (_, val) in entries {
            self.visit(val, depth);
        }
    }

    fn visit_embedded(&mut self, bytes: &[u8], depth: u8) {
        if depth >= self.max_depth {
            tracing::debug!(depth, "not following embedded CBOR past depth limit");
            return;
        }
        match parse_cbor(bytes) {
            Ok(inner) => self.visit(&inner, depth + 1),
            Err(e) => tracing::trace!(len = bytes.len(), error = %e, "byte string is not embedded CBOR"),
        }
    }

    fn visit_base64(&mut self, text: &str, depth: u8) {
        match decode_payload(text) {
            Ok(bytes) => self.visit_embedded(&bytes, depth),
            Err(e) => tracing::trace!(error = %e, "array text element is not base64"),
        }
    }
}

fn lookup<'a>(entries: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    entries.iter().find_map(|(k, v)| match k {
        Value::Text(text) if text == key => Some(v),
        _ => None,
    })
}

fn untag(mut value: &Value) -> &Value {
    while let Value::Tag(_, inner) = value {
        value = inner;
    }
    value
}
