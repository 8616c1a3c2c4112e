//! CBOR decoding on top of `ciborium`.

use std::io::ErrorKind;

use ciborium::Value;

use crate::error::InspectError;

/// A decoded top-level item together with how much input it used.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrefix {
    /// The decoded value.
    pub value: Value,
    /// Number of input bytes the value occupied.
    pub consumed: usize,
}

impl ParsedPrefix {
    /// Bytes left over after the value, given the original input length.
    #[must_use]
    pub fn trailing(&self, input_len: usize) -> usize {
        input_len.saturating_sub(self.consumed)
    }
}

/// Parse the single top-level CBOR item at the start of `bytes`.
///
/// Bytes after a complete item are ignored.
///
/// # Errors
/// Returns [`InspectError::CborParse`] if the input is truncated, starts
/// with an invalid initial byte, or holds an item the decoder rejects.
pub fn parse_cbor(bytes: &[u8]) -> Result<Value, InspectError> {
    parse_cbor_prefix(bytes).map(|parsed| parsed.value)
}

/// Like [`parse_cbor`], but also reports how many bytes the item used.
///
/// # Errors
/// See [`parse_cbor`].
pub fn parse_cbor_prefix(bytes: &[u8]) -> Result<ParsedPrefix, InspectError> {
    let mut reader = bytes;
    let value: Value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| decoder_error(e, bytes.len()))?;
    let consumed = bytes.len() - reader.len();
    tracing::debug!(consumed, total = bytes.len(), "parsed CBOR item");
    Ok(ParsedPrefix { value, consumed })
}

fn decoder_error(err: ciborium::de::Error<std::io::Error>, input_len: usize) -> InspectError {
    use ciborium::de::Error;

    let (message, offset) = match err {
        Error::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
            ("unexpected end of input".to_owned(), Some(input_len))
        }
        Error::Io(io) => (io.to_string(), None),
        Error::Syntax(at) => ("invalid CBOR syntax".to_owned(), Some(at)),
        Error::Semantic(at, msg) => (msg, at),
        Error::RecursionLimitExceeded => ("nesting exceeds the decoder recursion limit".to_owned(), None),
    };
    InspectError::CborParse { message, offset }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    fn encode(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(value, &mut buf).expect("encoding into a Vec cannot fail");
        buf
    }

    fn assert_round_trip(value: Value) {
        let bytes = encode(&value);
        let parsed = parse_cbor(&bytes).unwrap_or_else(|e| panic!("{value:?} failed: {e}"));
        assert_eq!(parsed, value);
    }

    #[test]
    fn scalars_round_trip() {
        assert_round_trip(Value::Integer(0.into()));
        assert_round_trip(Value::Integer(5655.into()));
        assert_round_trip(Value::Integer((-1_000_000_i64).into()));
        assert_round_trip(Value::Integer(u64::MAX.into()));
        assert_round_trip(Value::Bool(true));
        assert_round_trip(Value::Bool(false));
        assert_round_trip(Value::Null);
    }

    #[test]
    fn strings_round_trip() {
        assert_round_trip(Value::Text(String::new()));
        assert_round_trip(Value::Text("age_over_18".to_owned()));
        assert_round_trip(Value::Text("Grüße".to_owned()));
        assert_round_trip(Value::Bytes(vec![0x1c, 0xdf, 0x83, 0x32]));
        assert_round_trip(Value::Bytes(Vec::new()));
    }

    #[test]
    fn containers_round_trip_preserving_order() {
        assert_round_trip(Value::Array(vec![
            Value::Integer(1.into()),
            Value::Text("two".to_owned()),
            Value::Array(vec![Value::Null]),
        ]));
        assert_round_trip(Value::Map(vec![
            (Value::Text("z".to_owned()), Value::Integer(1.into())),
            (Value::Integer(7.into()), Value::Bytes(vec![0xff])),
            (Value::Text("a".to_owned()), Value::Map(Vec::new())),
        ]));
    }

    #[test]
    fn trailing_bytes_are_ignored_and_counted() {
        let bytes = [0x01, 0xff, 0xff];
        let parsed = parse_cbor_prefix(&bytes).expect("leading item is complete");
        assert_eq!(parsed.value, Value::Integer(1.into()));
        assert_eq!(parsed.consumed, 1);
        assert_eq!(parsed.trailing(bytes.len()), 2);
    }

    #[test]
    fn truncated_item_is_a_parse_error() {
        // Text string header announcing 5 bytes, only 2 present.
        let err = parse_cbor(&[0x65, b'h', b'e']).expect_err("truncated");
        match err {
            InspectError::CborParse { message, offset } => {
                assert!(message.contains("end of input"), "got {message}");
                assert_eq!(offset, Some(3));
            }
            other => panic!("expected CborParse, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(parse_cbor(&[]), Err(InspectError::CborParse { .. })));
    }

    #[test]
    fn lone_break_byte_is_a_parse_error() {
        assert!(matches!(parse_cbor(&[0xff]), Err(InspectError::CborParse { .. })));
    }

    /// Values from the model the round trip covers: integers, text, bytes,
    /// bools, null, and arrays and maps of those, with keys of any type.
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(|n| Value::Integer(n.into())),
            any::<u64>().prop_map(|n| Value::Integer(n.into())),
            ".{0,16}".prop_map(Value::Text),
            vec(any::<u8>(), 0..24).prop_map(Value::Bytes),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
        ];
        leaf.prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                vec(inner.clone(), 0..6).prop_map(Value::Array),
                vec((inner.clone(), inner), 0..6).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn proptest_round_trip(value in arb_value()) {
            let bytes = encode(&value);
            let parsed = parse_cbor(&bytes);
            prop_assert!(parsed.is_ok(), "{value:?} failed: {parsed:?}");
            prop_assert_eq!(parsed.ok(), Some(value));
        }

        #[test]
        fn proptest_prefix_consumes_exactly_one_item(value in arb_value(), tail in vec(any::<u8>(), 0..8)) {
            let mut bytes = encode(&value);
            let item_len = bytes.len();
            bytes.extend_from_slice(&tail);
            let parsed = parse_cbor_prefix(&bytes);
            prop_assert!(parsed.is_ok(), "{value:?} failed: {parsed:?}");
            if let Ok(parsed) = parsed {
                prop_assert_eq!(parsed.consumed, item_len);
                prop_assert_eq!(parsed.trailing(bytes.len()), tail.len());
                prop_assert_eq!(parsed.value, value);
            }
        }
    }
}
