//! Ordered field map for records
//!
//! Field order is part of the wire format: a record serializes its fields in
//! insertion order, and replacing an existing field keeps its position.
//! Records are small, so a vector of pairs with linear lookup is enough.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// Name of the field carrying a record's declared schema
pub const SCHEMA_FIELD: &str = "schema";

/// Name of the side map holding reference pairs
pub const POINTERS_FIELD: &str = "pointers";

/// Name of the side map holding temporal conditions
pub const TIMESTAMPS_FIELD: &str = "timestamps";

/// An ordered mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(name, _)| name == field)
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.position(field).map(|i| &self.fields[i].1)
    }

    /// Get a mutable field value
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.position(field).map(move |i| &mut self.fields[i].1)
    }

    /// Check whether a field is present
    pub fn contains_key(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Insert a field, returning the previous value.
    ///
    /// A replaced field keeps its original position; a new field is appended.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let field = field.into();
        let value = value.into();
        match self.position(&field) {
            Some(i) => Some(std::mem::replace(&mut self.fields[i].1, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Remove a field, preserving the order of the rest
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.position(field).map(|i| self.fields.remove(i).1)
    }

    /// Iterate over fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over field names in order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.iter().map(|(k, _)| k)
    }

    /// The embedded schema name, if the record carries one as a string
    pub fn schema(&self) -> Option<&str> {
        self.get(SCHEMA_FIELD).and_then(Value::as_str)
    }

    /// Convert to a JSON object in field order
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        record.extend(iter);
        record
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Record {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}
