//! Key canonicalization for Tessera
//!
//! Keys reach the wire in one of two shapes:
//! - a server-issued identifier: a decimal string of up to 128 bits, sent as is
//! - a custom key: any application value, hashed to a stable decimal string
//!
//! ## Contract
//!
//! Canonicalization is FROZEN for the lifetime of the protocol version:
//! the canonical text of the key is hashed with xxHash32 (seed 0) over its
//! UTF-8 bytes and the unsigned hash is written in decimal. It never depends
//! on platform, locale or number formatting settings.
//!
//! ```
//! use tessera_core::key::canonicalize_str;
//!
//! assert_eq!(canonicalize_str(""), "46947589");
//! assert_eq!(canonicalize_str("alice"), canonicalize_str("alice"));
//! ```

use std::fmt;

use xxhash_rust::xxh32::xxh32;

use crate::value::Value;

/// Seed used for every key hash
pub const KEY_HASH_SEED: u32 = 0;

/// Hash a key to its canonical decimal form
pub fn canonicalize(key: &Value) -> String {
    canonicalize_str(&canonical_text(key))
}

/// Hash already-textual key material
pub fn canonicalize_str(text: &str) -> String {
    xxh32(text.as_bytes(), KEY_HASH_SEED).to_string()
}

/// Textual form of a key before hashing.
///
/// Strings hash their raw contents, numbers their shortest round-trip
/// decimal form (floats always carry a fractional part, so `1` and `1.0`
/// hash differently), and structured values their compact wire JSON.
pub fn canonical_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_json().to_string(),
    }
}

/// True if `s` is a non-empty run of ASCII digits
pub fn is_decimal_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a raw pointer key to its wire string.
///
/// Integers and all-digit strings are server-issued identifiers and pass
/// through unchanged; anything else is canonicalized. Applying this to an
/// already resolved key is a no-op.
pub fn resolve_raw_key(raw: &Value) -> String {
    match raw {
        Value::Int(i) => i.to_string(),
        Value::String(s) if is_decimal_id(s) => s.clone(),
        other => canonicalize(other),
    }
}

/// A record key as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// Server-issued decimal identifier
    Id(String),
    /// Application value that must be canonicalized before use
    Custom(Box<Value>),
}

impl Key {
    /// A server-issued identifier
    pub fn id(id: u128) -> Self {
        Key::Id(id.to_string())
    }

    /// An application key, always canonicalized
    pub fn custom(value: impl Into<Value>) -> Self {
        Key::Custom(Box::new(value.into()))
    }

    /// Classify a raw value with the pointer-resolution rule
    pub fn from_raw(raw: Value) -> Self {
        match raw {
            Value::Int(i) => Key::Id(i.to_string()),
            Value::String(s) if is_decimal_id(&s) => Key::Id(s),
            other => Key::Custom(Box::new(other)),
        }
    }

    /// The wire string for this key
    pub fn resolve(&self) -> String {
        match self {
            Key::Id(id) => id.clone(),
            Key::Custom(value) => canonicalize(value),
        }
    }

    /// True for server-issued identifiers
    pub fn is_id(&self) -> bool {
        matches!(self, Key::Id(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl From<u64> for Key {
    fn from(id: u64) -> Self {
        Key::Id(id.to_string())
    }
}

impl From<u128> for Key {
    fn from(id: u128) -> Self {
        Key::Id(id.to_string())
    }
}

impl From<i64> for Key {
    fn from(id: i64) -> Self {
        Key::from_raw(Value::Int(id))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::from_raw(Value::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from_raw(Value::String(s))
    }
}

impl From<Value> for Key {
    fn from(v: Value) -> Self {
        Key::from_raw(v)
    }
}
