//! Human-readable rendering of decoded CBOR values.
//!
//! Output follows CBOR diagnostic notation closely enough to be familiar:
//! byte strings as `h'..'`, tags as `N(..)`, map keys of any type. Entries
//! keep their encounter order; nothing is sorted or canonicalized.

use std::fmt::Write as _;

use ciborium::Value;
use serde_json::{json, Map, Number};

use crate::payload::to_hex;

/// Default spaces per nesting level.
pub const DEFAULT_INDENT: u8 = 2;

/// Render `value` with the default indent width.
#[must_use]
pub fn render(value: &Value) -> String {
    render_with_indent(value, DEFAULT_INDENT)
}

/// Render `value` using `indent` spaces per nesting level.
#[must_use]
pub fn render_with_indent(value: &Value, indent: u8) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, usize::from(indent));
    out
}

/// Render `value` on a single line, as used for non-text map keys in JSON.
#[must_use]
pub fn render_inline(value: &Value) -> String {
    let mut out = String::new();
    write_inline(&mut out, value);
    out
}

/// Convert `value` into JSON.
///
/// Byte strings become hex strings, non-text map keys are rendered inline,
/// and integers outside the 64-bit range become decimal strings. A key that
/// collides with an earlier one gets a `#2`, `#3`, ... suffix so no entry is
/// lost.
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Integer(int) => {
            let wide = i128::from(*int);
            if let Ok(n) = i64::try_from(wide) {
                json!(n)
            } else if let Ok(n) = u64::try_from(wide) {
                json!(n)
            } else {
                json!(wide.to_string())
            }
        }
        Value::Float(float) => Number::from_f64(*float).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Bytes(bytes) => json!(to_hex(bytes)),
        Value::Text(text) => json!(text),
        Value::Bool(b) => json!(b),
        Value::Null => serde_json::Value::Null,
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, val) in entries {
                let key = match key {
                    Value::Text(text) => text.clone(),
                    other => render_inline(other),
                };
                let key = unique_key(&object, key);
                object.insert(key, to_json(val));
            }
            serde_json::Value::Object(object)
        }
        Value::Tag(tag, inner) => json!({ "tag": tag, "value": to_json(inner) }),
        other => json!(format!("{other:?}")),
    }
}

fn unique_key(object: &Map<String, serde_json::Value>, key: String) -> String {
    if !object.contains_key(&key) {
        return key;
    }
    let mut n = 2_u32;
    loop {
        let candidate = format!("{key}#{n}");
        if !object.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize, indent: usize) {
    match value {
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                pad(out, depth + 1, indent);
                write_value(out, item, depth + 1, indent);
                separator(out, i + 1 == items.len());
            }
            pad(out, depth, indent);
            out.push(']');
        }
        Value::Map(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Map(entries) => {
            out.push_str("{\n");
            for (i, (key, val)) in entries.iter().enumerate() {
                pad(out, depth + 1, indent);
                write_value(out, key, depth + 1, indent);
                out.push_str(": ");
                write_value(out, val, depth + 1, indent);
                separator(out, i + 1 == entries.len());
            }
            pad(out, depth, indent);
            out.push('}');
        }
        Value::Tag(tag, inner) => {
            let _ = write!(out, "{tag}(");
            write_value(out, inner, depth, indent);
            out.push(')');
        }
        scalar => write_scalar(out, scalar),
    }
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item);
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, key);
                out.push_str(": ");
                write_inline(out, val);
            }
            out.push('}');
        }
        Value::Tag(tag, inner) => {
            let _ = write!(out, "{tag}(");
            write_inline(out, inner);
            out.push(')');
        }
        scalar => write_scalar(out, scalar),
    }
}

fn write_scalar(out: &mut String, value: &Value) {
    // Writing to a String cannot fail, so results are discarded throughout.
    match value {
        Value::Integer(int) => {
            let _ = write!(out, "{}", i128::from(*int));
        }
        Value::Float(float) => {
            let _ = write!(out, "{float:?}");
        }
        Value::Bytes(bytes) => {
            let _ = write!(out, "h'{}'", to_hex(bytes));
        }
        Value::Text(text) => {
            let _ = write!(out, "{text:?}");
        }
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Null => out.push_str("null"),
        other => {
            let _ = write!(out, "{other:?}");
        }
    }
}

fn pad(out: &mut String, depth: usize, indent: usize) {
    out.extend(std::iter::repeat(' ').take(depth.saturating_mul(indent)));
}

fn separator(out: &mut String, last: bool) {
    out.push_str(if last { "\n" } else { ",\n" });
}
