//! Integration test: the mdoc issuer-signed item captured from a wallet
//! presentation, driven through the public API.

use envelope_core::{
    decode_payload, diagnose_failure, inspect, inspect_bytes, parse_cbor, render, AgeCheck,
    DecodedBytes, InspectConfig, InspectError, Report, Value,
};

const SAMPLE: &str = "pGhkaWdlc3RJRBkWF2ZyYW5kb21QHN+DMvBOaGr5GzeSFPIIdnFlbGVtZW50SWRlbnRpZmllcmthZ2Vfb3Zlcl8xOGxlbGVtZW50VmFsdWX1";

const SAMPLE_HEX: &str = "a46864696765737449441916176672616e646f6d501cdf8332f04e686af91b379214f2087671656c656d656e744964656e7469666965726b6167655f6f7665725f31386c656c656d656e7456616c7565f5";

const SAMPLE_SHA256: &str = "e3f761f1c377f5ab69dd807ce05f70b75f140fe0f109de9ee790e0ace9993096";

fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

fn sample_bytes() -> DecodedBytes {
    decode_payload(SAMPLE).expect("sample payload is valid base64")
}

#[test]
fn sample_decodes_to_expected_bytes() {
    let bytes = sample_bytes();
    assert_eq!(bytes.len(), 81);
    assert_eq!(envelope_core::payload::to_hex(&bytes), SAMPLE_HEX);
    assert_eq!(bytes.digest().to_string(), SAMPLE_SHA256);
}

#[test]
fn sample_parses_to_four_entry_issuer_signed_item() {
    let value = parse_cbor(&sample_bytes()).expect("sample is well-formed CBOR");
    let expected = Value::Map(vec![
        (text("digestID"), Value::Integer(5655.into())),
        (
            text("random"),
            Value::Bytes(vec![
                0x1c, 0xdf, 0x83, 0x32, 0xf0, 0x4e, 0x68, 0x6a, 0xf9, 0x1b, 0x37, 0x92, 0x14, 0xf2,
                0x08, 0x76,
            ]),
        ),
        (text("elementIdentifier"), text("age_over_18")),
        (text("elementValue"), Value::Bool(true)),
    ]);
    assert_eq!(value, expected);
}

#[test]
fn sample_render_shows_every_pair_in_order() {
    let value = parse_cbor(&sample_bytes()).expect("sample is well-formed CBOR");
    let rendered = render(&value);
    let expected = "{\n  \"digestID\": 5655,\n  \"random\": h'1cdf8332f04e686af91b379214f20876',\n  \"elementIdentifier\": \"age_over_18\",\n  \"elementValue\": true\n}";
    assert_eq!(rendered, expected);
}

#[test]
fn sample_report_includes_claims() {
    let report = inspect(SAMPLE, &InspectConfig::default());
    let Report::Parsed(parsed) = &report else {
        panic!("expected the sample to parse, got {report:?}");
    };
    assert_eq!(parsed.trailing, 0);
    assert_eq!(parsed.claims.age_over_18, Some(true));

    let text = report.to_string();
    assert!(text.contains("Decoded bytes length: 81"), "got {text}");
    assert!(text.contains(SAMPLE_SHA256), "got {text}");
    assert!(text.contains("age_over_18: true"), "got {text}");

    let json = report.to_json();
    assert_eq!(json["status"], "parsed");
    assert_eq!(json["value"]["digestID"], 5655);
    assert_eq!(json["value"]["random"], "1cdf8332f04e686af91b379214f20876");
    assert_eq!(json["claims"]["age_over_18"], true);
}

#[test]
fn sample_attestation_settles_min_age_check() {
    let mut config = InspectConfig::default();
    config.min_age = Some(18);
    let report = inspect(SAMPLE, &config);
    let Report::Parsed(parsed) = &report else {
        panic!("expected the sample to parse, got {report:?}");
    };
    // No birth date in the item, so there is no age, but the issuer vouches for 18+.
    assert_eq!(parsed.age, None);
    assert_eq!(parsed.age_check, Some(AgeCheck { min_age: 18, met: Some(true) }));

    let text = report.to_string();
    assert!(text.contains("minimum age 18: met"), "got {text}");
    let json = report.to_json();
    assert_eq!(json["age"], serde_json::Value::Null);
    assert_eq!(json["min_age_met"], true);

    config.min_age = Some(21);
    let report = inspect(SAMPLE, &config);
    assert!(report.to_string().contains("minimum age 21: undetermined"));
}

#[test]
fn truncated_sample_fails_and_keeps_classification() {
    let full = sample_bytes();
    let truncated = &full[..full.len() - 1];

    let err = parse_cbor(truncated).expect_err("missing final value byte");
    assert!(matches!(err, InspectError::CborParse { .. }), "got {err:?}");

    let text = diagnose_failure(truncated);
    assert!(text.contains("Decoded bytes length: 80"), "got {text}");
    assert!(text.contains("First byte: 0xa4"), "got {text}");
    assert!(text.contains("map with 4 entries"), "got {text}");

    let report = inspect_bytes(&DecodedBytes::new(truncated.to_vec()), &InspectConfig::default());
    assert!(matches!(report, Report::Diagnosed(_)), "got {report:?}");
}

#[test]
fn five_entry_header_is_classified_as_such() {
    let mut bytes = sample_bytes().into_inner();
    bytes[0] = 0xa5;

    // Header promises a fifth pair that never arrives.
    assert!(parse_cbor(&bytes).is_err());
    let text = diagnose_failure(&bytes);
    assert!(text.contains("map with 5 entries"), "got {text}");
}
