//! Response decoding
//!
//! Server replies nest JSON documents inside JSON strings, sometimes several
//! levels deep. The decoder unwraps them recursively. All-digit strings
//! longer than [`OPAQUE_DIGITS_THRESHOLD`] are identifiers that would lose
//! precision as numbers, so they stay strings.
//!
//! Decoding never fails: text that is not JSON is returned as a literal.

use serde_json::Value as JsonValue;

/// Digit strings longer than this are kept as opaque identifiers
pub const OPAQUE_DIGITS_THRESHOLD: usize = 16;

/// True for all-digit text too long to survive numeric parsing
pub fn is_opaque_identifier(text: &str) -> bool {
    text.len() > OPAQUE_DIGITS_THRESHOLD && text.bytes().all(|b| b.is_ascii_digit())
}

/// Recursively decode a parsed value.
///
/// Objects keep their keys and order; arrays keep their order; non-string
/// scalars pass through.
pub fn decode(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(text) => decode_text(text),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(decode).collect()),
        JsonValue::Object(map) => {
            JsonValue::Object(map.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
        other => other,
    }
}

/// Decode one reply line, with or without its terminator.
///
/// ```
/// use serde_json::json;
/// use tessera_wire::decode_line;
///
/// assert_eq!(decode_line(r#"{"value":"{\"n\":1}"}"#), json!({"value": {"n": 1}}));
/// assert_eq!(
///     decode_line(r#""123456789012345678901234567890""#),
///     json!("123456789012345678901234567890")
/// );
/// ```
pub fn decode_line(line: &str) -> JsonValue {
    decode_text(line.trim_end_matches(['\r', '\n']).to_string())
}

// Parsing a string literal always yields shorter text, so this terminates
fn decode_text(text: String) -> JsonValue {
    if is_opaque_identifier(&text) {
        return JsonValue::String(text);
    }
    match serde_json::from_str::<JsonValue>(&text) {
        Ok(parsed) => decode(parsed),
        Err(_) => JsonValue::String(text),
    }
}
