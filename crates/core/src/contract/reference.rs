//! Cross-keyspace pointers
//!
//! A reference names a record in another keyspace. On the wire it is the
//! ordered pair `[keyspace, resolved_key]`, where the key is resolved with
//! the pointer rule: integers and all-digit strings are server-issued
//! identifiers and pass through, anything else is canonicalized.

use crate::key::Key;
use crate::value::Value;

/// A typed pointer to a record in another keyspace
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    keyspace: String,
    key: Key,
}

impl Reference {
    /// Point at `key` in `keyspace`, classifying the key with the pointer rule
    pub fn new(keyspace: impl Into<String>, key: impl Into<Value>) -> Self {
        Reference {
            keyspace: keyspace.into(),
            key: Key::from_raw(key.into()),
        }
    }

    /// Point at an explicitly classified key
    pub fn with_key(keyspace: impl Into<String>, key: Key) -> Self {
        Reference {
            keyspace: keyspace.into(),
            key,
        }
    }

    /// Target keyspace
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Target key before resolution
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The `(keyspace, resolved_key)` wire pair
    pub fn wire_pair(&self) -> (String, String) {
        (self.keyspace.clone(), self.key.resolve())
    }

    /// The wire pair as a record value
    pub fn to_value(&self) -> Value {
        let (keyspace, key) = self.wire_pair();
        Value::Array(vec![Value::String(keyspace), Value::String(key)])
    }

    /// The wire pair as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let (keyspace, key) = self.wire_pair();
        serde_json::json!([keyspace, key])
    }
}
