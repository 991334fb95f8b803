//! Record normalization
//!
//! Rewrites a record into the shape the server expects, in a single pass
//! over its top-level fields:
//!
//! 1. A `Reference` field becomes its `[keyspace, resolved_key]` pair.
//! 2. A `Temporal` field becomes its discriminant form.
//! 3. The `pointers` side map has each pair's key re-resolved with the
//!    pointer rule, so records carrying pre-resolved pairs (for instance
//!    from schema validation) come out unchanged.
//!
//! Typed values nested inside arrays and objects are rewritten the same way.
//!
//! Normalization is all-or-nothing: a malformed pointer entry fails the
//! whole record and no partially normalized record is returned.

use crate::error::{Error, Result};
use crate::key::resolve_raw_key;
use crate::record::{Record, POINTERS_FIELD};
use crate::value::Value;

/// Normalize a record for the wire
pub fn normalize(record: &Record) -> Result<Record> {
    let mut out = Record::with_capacity(record.len());
    for (field, value) in record.iter() {
        let normalized = if field == POINTERS_FIELD {
            normalize_pointers(value)?
        } else {
            normalize_value(value)
        };
        out.insert(field.clone(), normalized);
    }
    Ok(out)
}

/// Rewrite typed values to wire form, recursing into arrays and objects
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Reference(r) => r.to_value(),
        Value::Temporal(t) => t.to_value(),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(record) => Value::Object(
            record
                .iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Normalize a `pointers` side map of field -> `[keyspace, key]`
pub fn normalize_pointers(value: &Value) -> Result<Value> {
    match value {
        Value::Object(entries) => {
            let mut out = Record::with_capacity(entries.len());
            for (name, entry) in entries.iter() {
                out.insert(name.clone(), resolve_pointer_entry(name, entry)?);
            }
            Ok(Value::Object(out))
        }
        Value::Null => Ok(Value::Null),
        other => Err(Error::Normalization {
            field: POINTERS_FIELD.to_string(),
            reason: format!(
                "expected a mapping of field to [keyspace, key] pairs, got {}",
                other.type_name()
            ),
        }),
    }
}

fn resolve_pointer_entry(name: &str, entry: &Value) -> Result<Value> {
    let malformed = |reason: String| Error::Normalization {
        field: format!("{}.{}", POINTERS_FIELD, name),
        reason,
    };
    match entry {
        Value::Reference(r) => Ok(r.to_value()),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(keyspace), key] => Ok(Value::Array(vec![
                Value::String(keyspace.clone()),
                Value::String(resolve_raw_key(key)),
            ])),
            [other, _] => Err(malformed(format!(
                "keyspace must be a string, got {}",
                other.type_name()
            ))),
            items => Err(malformed(format!(
                "expected a 2-element [keyspace, key] pair, got {} element(s)",
                items.len()
            ))),
        },
        other => Err(malformed(format!(
            "expected a 2-element [keyspace, key] pair, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Reference, TemporalCondition};
    use crate::key::canonicalize_str;

    fn pair(keyspace: &str, key: impl Into<Value>) -> Value {
        Value::Array(vec![Value::from(keyspace), key.into()])
    }

    #[test]
    fn test_reference_field_becomes_pair() {
        let record = Record::new()
            .with("name", "Alice")
            .with("dep", Reference::new("depts", "eng-1"));
        let out = normalize(&record).unwrap();
        assert_eq!(
            out.get("dep"),
            Some(&pair("depts", canonicalize_str("eng-1")))
        );
        assert_eq!(out.get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_temporal_field_serialized_in_place() {
        let record = Record::new().with("seen", TemporalCondition::Before("t0".into()));
        let out = normalize(&record).unwrap();
        assert_eq!(
            out.get("seen").unwrap().to_json(),
            serde_json::json!({"before_timestamp": "t0"})
        );
    }

    #[test]
    fn test_pointers_are_re_resolved() {
        let pointers = Record::new()
            .with("dep", pair("depts", "eng-1"))
            .with("boss", pair("users", "42"))
            .with("team", pair("teams", 7));
        let record = Record::new().with(POINTERS_FIELD, pointers);
        let out = normalize(&record).unwrap();
        let ptrs = out.get(POINTERS_FIELD).unwrap().as_object().unwrap();
        assert_eq!(ptrs.get("dep"), Some(&pair("depts", canonicalize_str("eng-1"))));
        assert_eq!(ptrs.get("boss"), Some(&pair("users", "42")));
        assert_eq!(ptrs.get("team"), Some(&pair("teams", "7")));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let record = Record::new()
            .with("dep", Reference::new("depts", "eng-1"))
            .with(
                POINTERS_FIELD,
                Record::new().with("boss", Reference::new("users", "bob")),
            );
        let once = normalize(&record).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_references_rewritten() {
        let record = Record::new().with(
            "links",
            Value::Array(vec![Value::Reference(Reference::new("docs", "1"))]),
        );
        let out = normalize(&record).unwrap();
        assert_eq!(
            out.get("links"),
            Some(&Value::Array(vec![pair("docs", "1")]))
        );
    }

    #[test]
    fn test_malformed_pointer_names_field() {
        let record = Record::new().with(
            POINTERS_FIELD,
            Record::new().with("dep", Value::Array(vec![Value::from("depts")])),
        );
        match normalize(&record) {
            Err(Error::Normalization { field, .. }) => assert_eq!(field, "pointers.dep"),
            other => panic!("Expected Normalization error, got {:?}", other),
        }
    }

    #[test]
    fn test_pointer_keyspace_must_be_string() {
        let record = Record::new().with(
            POINTERS_FIELD,
            Record::new().with("dep", Value::Array(vec![Value::Int(1), Value::Int(2)])),
        );
        assert!(matches!(
            normalize(&record),
            Err(Error::Normalization { .. })
        ));
    }

    #[test]
    fn test_pointers_must_be_mapping() {
        let record = Record::new().with(POINTERS_FIELD, "nope");
        match normalize(&record) {
            Err(Error::Normalization { field, .. }) => assert_eq!(field, "pointers"),
            other => panic!("Expected Normalization error, got {:?}", other),
        }
    }
}
