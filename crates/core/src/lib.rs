//! Core types for the Tessera client protocol
//!
//! This crate defines everything a request is made of before it is encoded:
//! - Value / Record: field values and ordered records
//! - Key: server-issued identifiers and custom keys, with canonicalization
//! - Reference / TemporalCondition: typed values with a dedicated wire form
//! - Limit: result-limit windows
//! - normalize: rewriting records into wire shape
//! - schema: descriptor-driven validation
//! - Error: validation and normalization errors
//!
//! Every function here is pure and safe to call concurrently.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod key;
pub mod limits;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod value;

pub use contract::{Reference, TemporalCondition};
pub use error::{Error, Result};
pub use key::{canonicalize, canonicalize_str, is_decimal_id, resolve_raw_key, Key};
pub use limits::Limit;
pub use normalize::{normalize, normalize_pointers, normalize_value};
pub use record::{Record, POINTERS_FIELD, SCHEMA_FIELD, TIMESTAMPS_FIELD};
pub use schema::{validate, FieldType, PrimitiveType, SchemaDescriptor};
pub use value::Value;
