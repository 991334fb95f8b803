//! Search criteria preparation.
//!
//! Criteria are predicates, not records, so references are not compared
//! literally: a field holding a reference is moved into a `pointers`
//! sub-object of resolved `[keyspace, key]` pairs and the server evaluates
//! it against resolved keys. Temporal conditions stay in place in their
//! discriminant form.

use tessera_core::{normalize_pointers, normalize_value, Record, Result, Value, POINTERS_FIELD};

/// Split references out of `criteria` and serialize temporal conditions
pub fn split_search_criteria(criteria: &Record) -> Result<Record> {
    let mut out = Record::with_capacity(criteria.len());
    let mut pointers = Record::new();

    for (field, value) in criteria.iter() {
        match value {
            Value::Reference(r) => {
                pointers.insert(field.clone(), r.to_value());
            }
            Value::Temporal(t) => {
                out.insert(field.clone(), t.to_value());
            }
            _ if field == POINTERS_FIELD => {
                // Caller-supplied pairs merge with the extracted ones
                if let Value::Object(existing) = normalize_pointers(value)? {
                    for (name, pair) in existing {
                        if !pointers.contains_key(&name) {
                            pointers.insert(name, pair);
                        }
                    }
                }
            }
            other => {
                out.insert(field.clone(), normalize_value(other));
            }
        }
    }

    if !pointers.is_empty() {
        out.insert(POINTERS_FIELD, pointers);
    }
    Ok(out)
}
