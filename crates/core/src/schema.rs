//! Schema descriptors and record validation
//!
//! A [`SchemaDescriptor`] names a record shape and maps each field to a
//! [`FieldType`]. Field types form a closed set checked by a single
//! dispatch function, [`FieldType::matches`]:
//!
//! | Tag | Accepts |
//! |-----|---------|
//! | `null`, `bool`, `int`, `float`, `string`, `array`, `object` | exactly that runtime type |
//! | `list<T>` | an array whose elements are all `T` |
//! | `reference` | a [`Reference`](crate::Reference) |
//! | `timestamp` | a [`TemporalCondition`](crate::TemporalCondition) |
//! | `[a, b, ..]` | any one of the listed types |
//!
//! Descriptors deserialize from JSON or TOML:
//!
//! ```
//! use tessera_core::SchemaDescriptor;
//!
//! let schema: SchemaDescriptor = serde_json::from_str(
//!     r#"{"name": "Person", "fields": {"name": "string", "age": ["int", "float"]}}"#,
//! ).unwrap();
//! assert_eq!(schema.name(), "Person");
//! assert_eq!(schema.len(), 2);
//! ```
//!
//! ## Validation Contract
//!
//! Validation enforces presence, not nullability: every declared field must
//! be supplied, but an explicit `null` is accepted for any declared type.
//! A record is valid or it does not exist; there are no partial results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::record::{Record, POINTERS_FIELD, SCHEMA_FIELD, TIMESTAMPS_FIELD};
use crate::value::Value;

/// JSON-shaped runtime types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// `null`
    Null,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `string`
    String,
    /// `array`
    Array,
    /// `object`
    Object,
}

impl PrimitiveType {
    /// Tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::String => "string",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (PrimitiveType::Null, Value::Null)
                | (PrimitiveType::Bool, Value::Bool(_))
                | (PrimitiveType::Int, Value::Int(_))
                | (PrimitiveType::Float, Value::Float(_))
                | (PrimitiveType::String, Value::String(_))
                | (PrimitiveType::Array, Value::Array(_))
                | (PrimitiveType::Object, Value::Object(_))
        )
    }
}

impl FromStr for PrimitiveType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Ok(match tag {
            "null" => PrimitiveType::Null,
            "bool" => PrimitiveType::Bool,
            "int" => PrimitiveType::Int,
            "float" => PrimitiveType::Float,
            "string" => PrimitiveType::String,
            "array" => PrimitiveType::Array,
            "object" => PrimitiveType::Object,
            other => {
                return Err(Error::InvalidSchema {
                    reason: format!("unknown type tag '{}'", other),
                })
            }
        })
    }
}

/// Expected type of a declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Exactly this runtime type
    Primitive(PrimitiveType),
    /// Array of this runtime type
    ListOf(PrimitiveType),
    /// Cross-keyspace pointer
    Reference,
    /// Timestamp or time-range predicate
    Temporal,
    /// Any of the listed types
    OneOf(Vec<FieldType>),
}

impl FieldType {
    /// Shorthand for `Primitive(PrimitiveType::String)`
    pub const STRING: FieldType = FieldType::Primitive(PrimitiveType::String);
    /// Shorthand for `Primitive(PrimitiveType::Int)`
    pub const INT: FieldType = FieldType::Primitive(PrimitiveType::Int);
    /// Shorthand for `Primitive(PrimitiveType::Float)`
    pub const FLOAT: FieldType = FieldType::Primitive(PrimitiveType::Float);
    /// Shorthand for `Primitive(PrimitiveType::Bool)`
    pub const BOOL: FieldType = FieldType::Primitive(PrimitiveType::Bool);

    /// Check a runtime value against this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Primitive(p) => p.matches(value),
            FieldType::ListOf(p) => match value {
                Value::Array(items) => items.iter().all(|item| p.matches(item)),
                _ => false,
            },
            FieldType::Reference => value.is_reference(),
            FieldType::Temporal => value.is_temporal(),
            FieldType::OneOf(options) => options.iter().any(|t| t.matches(value)),
        }
    }

    fn tags(&self) -> Vec<String> {
        match self {
            FieldType::OneOf(options) => options.iter().flat_map(FieldType::tags).collect(),
            other => vec![other.to_string()],
        }
    }

    fn from_json(raw: &serde_json::Value) -> Result<Self> {
        match raw {
            serde_json::Value::String(tag) => tag.parse(),
            serde_json::Value::Array(tags) if !tags.is_empty() => Ok(FieldType::OneOf(
                tags.iter().map(FieldType::from_json).collect::<Result<_>>()?,
            )),
            other => Err(Error::InvalidSchema {
                reason: format!("expected a type tag or a list of tags, got {}", other),
            }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => f.write_str(p.as_str()),
            FieldType::ListOf(p) => write!(f, "list<{}>", p.as_str()),
            FieldType::Reference => f.write_str("reference"),
            FieldType::Temporal => f.write_str("timestamp"),
            FieldType::OneOf(_) => f.write_str(&self.tags().join(" | ")),
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        match tag {
            "reference" => Ok(FieldType::Reference),
            "timestamp" => Ok(FieldType::Temporal),
            _ => match tag.strip_prefix("list<").and_then(|t| t.strip_suffix('>')) {
                Some(inner) => Ok(FieldType::ListOf(inner.trim().parse()?)),
                None => Ok(FieldType::Primitive(tag.parse()?)),
            },
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldType::OneOf(_) => self.tags().serialize(serializer),
            other => other.to_string().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        FieldType::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// A named record shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    name: String,
    #[serde(with = "ordered_fields")]
    fields: Vec<(String, FieldType)>,
}

impl SchemaDescriptor {
    /// Create an empty descriptor
    pub fn new(name: impl Into<String>) -> Self {
        SchemaDescriptor {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field declaration; redeclaring a field replaces its type
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field_type,
            None => self.fields.push((name, field_type)),
        }
        self
    }

    /// Declared schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of a field
    pub fn get(&self, field: &str) -> Option<&FieldType> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, t)| t)
    }

    /// Declared fields in order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields are declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a record against this descriptor
    pub fn validate(&self, fields: &Record) -> Result<Record> {
        validate(fields, self)
    }
}

mod ordered_fields {
    use super::FieldType;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        fields: &[(String, FieldType)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serde_json::Map::with_capacity(fields.len());
        for (name, field_type) in fields {
            let tag = serde_json::to_value(field_type)
                .map_err(<S::Error as serde::ser::Error>::custom)?;
            map.insert(name.clone(), tag);
        }
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, FieldType)>, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        map.into_iter()
            .map(|(name, raw)| {
                FieldType::from_json(&raw)
                    .map(|t| (name, t))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Validate `fields` against `descriptor`.
///
/// On success the returned record holds the declared fields in declaration
/// order, with reference fields moved into a `pointers` side map (as
/// resolved `[keyspace, key]` pairs), temporal fields moved into a
/// `timestamps` side map (in wire form), and `schema` set to the
/// descriptor's name.
pub fn validate(fields: &Record, descriptor: &SchemaDescriptor) -> Result<Record> {
    // Merge: every declared field, with whatever the caller supplied
    let merged: Vec<(&str, &FieldType, Option<&Value>)> = descriptor
        .fields()
        .map(|(name, t)| (name, t, fields.get(name)))
        .collect();

    if let Some((name, _, _)) = merged.iter().find(|(_, _, v)| v.is_none()) {
        return Err(Error::MissingField {
            field: name.to_string(),
        });
    }

    if let Some(extra) = fields.keys().find(|k| descriptor.get(k).is_none()) {
        return Err(Error::ExtraField {
            field: extra.clone(),
        });
    }

    let mut main = Record::with_capacity(merged.len() + 3);
    let mut pointers = Record::new();
    let mut timestamps = Record::new();

    for (name, field_type, value) in merged {
        let Some(value) = value else { continue };
        if value.is_null() {
            main.insert(name, Value::Null);
            continue;
        }
        if !field_type.matches(value) {
            return Err(Error::TypeMismatch {
                field: name.to_string(),
                expected: field_type.to_string(),
                actual: value.type_name().to_string(),
            });
        }
        // Split on what the value is, so one-of fields route the same way
        match value {
            Value::Reference(r) => {
                pointers.insert(name, r.to_value());
            }
            Value::Temporal(t) => {
                timestamps.insert(name, t.to_value());
            }
            _ => {
                main.insert(name, value.clone());
            }
        }
    }

    if !pointers.is_empty() {
        main.insert(POINTERS_FIELD, pointers);
    }
    if !timestamps.is_empty() {
        main.insert(TIMESTAMPS_FIELD, timestamps);
    }
    main.insert(SCHEMA_FIELD, descriptor.name());
    Ok(main)
}
