//! Query envelope encoding for the Tessera wire protocol
//!
//! One request is one JSON object followed by a newline. Data-plane
//! envelopes carry every key below, with `null` for unused payload slots:
//!
//! ```text
//! {"schema", "username", "password", "keyspace", "store", "persistent",
//!  "distributed", "limit_output", "key", "value", "command", "expire",
//!  "bulk_values", "bulk_keys", "bulk_keys_values", "search_criteria",
//!  "with_pointers", "with_pointers_metadata"}
//! ```
//!
//! `value`, each entry of `bulk_values`, each value of `bulk_keys_values`
//! and `search_criteria` are themselves JSON documents encoded as strings.
//! Keys are always decimal strings so 128-bit identifiers survive the trip.
//!
//! Subscription envelopes additionally end with the marker field
//! `"subscribe":true`. The transport is told the command kind explicitly
//! through [`QueryEnvelope::kind`]; the marker keeps the bytes compatible
//! with servers that detect streaming requests textually.

use std::borrow::Cow;

use serde_json::{Map, Value as JsonValue};
use tessera_core::{normalize, Error, Key, Limit, Record, Result, Value, SCHEMA_FIELD};
use tracing::trace;

use crate::command::{Command, CommandKind};
use crate::context::QueryContext;
use crate::criteria::split_search_criteria;

/// Text that marks an encoded envelope as a subscription
pub const SUBSCRIPTION_MARKER: &str = r#""subscribe":true"#;

/// Textual subscription detection over encoded bytes.
///
/// The builder never needs this; it exists for byte-level compatibility
/// checks against envelopes produced elsewhere.
pub fn has_subscription_marker(encoded: &[u8]) -> bool {
    let marker = SUBSCRIPTION_MARKER.as_bytes();
    encoded.windows(marker.len()).any(|w| w == marker)
}

/// Parameters of one data-plane call.
///
/// Built once per call and never mutated after [`build`] serializes it.
///
/// ```
/// use tessera_core::{Limit, Record};
/// use tessera_wire::{Command, QueryRequest};
///
/// let request = QueryRequest::new(Command::Search)
///     .search_criteria(Record::new().with("name", "Alice"))
///     .limit(Limit::new(0, 10));
/// assert_eq!(request.command(), &Command::Search);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    command: Command,
    key: Option<Key>,
    value: Option<Record>,
    search_criteria: Option<Record>,
    bulk_values: Option<Vec<Record>>,
    bulk_keys: Option<Vec<Key>>,
    bulk_keys_values: Option<Vec<(Key, Record)>>,
    limit: Option<Limit>,
    expire_seconds: Option<u64>,
    with_pointers: bool,
    with_pointers_metadata: bool,
}

impl QueryRequest {
    /// Start a request for `command` with every payload slot empty
    pub fn new(command: Command) -> Self {
        QueryRequest {
            command,
            key: None,
            value: None,
            search_criteria: None,
            bulk_values: None,
            bulk_keys: None,
            bulk_keys_values: None,
            limit: None,
            expire_seconds: None,
            with_pointers: false,
            with_pointers_metadata: false,
        }
    }

    /// The command
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Single key
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Single value
    pub fn value(mut self, value: Record) -> Self {
        self.value = Some(value);
        self
    }

    /// Search criteria
    pub fn search_criteria(mut self, criteria: Record) -> Self {
        self.search_criteria = Some(criteria);
        self
    }

    /// Bulk values, all declaring the same schema
    pub fn bulk_values(mut self, values: Vec<Record>) -> Self {
        self.bulk_values = Some(values);
        self
    }

    /// Bulk keys
    pub fn bulk_keys<K: Into<Key>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.bulk_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Bulk key/value pairs
    pub fn bulk_keys_values<K: Into<Key>>(
        mut self,
        entries: impl IntoIterator<Item = (K, Record)>,
    ) -> Self {
        self.bulk_keys_values = Some(entries.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    /// Result-limit window, overriding the context default
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Result-limit window from a raw slice; anything but a pair is rejected
    pub fn limit_pair(self, pair: &[u64]) -> Result<Self> {
        Ok(self.limit(Limit::try_from(pair)?))
    }

    /// Expiry in seconds
    pub fn expire(mut self, seconds: u64) -> Self {
        self.expire_seconds = Some(seconds);
        self
    }

    /// Ask for referenced records to be resolved in the reply
    pub fn with_pointers(mut self, enabled: bool) -> Self {
        self.with_pointers = enabled;
        self
    }

    /// Ask for pointer metadata instead of resolved records
    pub fn with_pointers_metadata(mut self, enabled: bool) -> Self {
        self.with_pointers_metadata = enabled;
        self
    }
}

/// A serialized request, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEnvelope {
    command: String,
    kind: CommandKind,
    bytes: Vec<u8>,
}

impl QueryEnvelope {
    pub(crate) fn new(command: impl Into<String>, kind: CommandKind, bytes: Vec<u8>) -> Self {
        QueryEnvelope {
            command: command.into(),
            kind,
            bytes,
        }
    }

    /// Command name, for logging
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Reply shape the transport must expect
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// True for streaming requests
    pub fn is_subscription(&self) -> bool {
        self.kind == CommandKind::Subscription
    }

    /// Encoded UTF-8 JSON, without the line terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded JSON as text
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing was encoded
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Tracks the schema names declared across the payload slots of one call
#[derive(Default)]
struct SchemaUnity {
    seen: Vec<Option<String>>,
}

impl SchemaUnity {
    fn observe(&mut self, schema: Option<String>) {
        if !self.seen.contains(&schema) {
            self.seen.push(schema);
        }
    }

    fn resolve(self) -> Result<Option<String>> {
        match self.seen.len() {
            0 => Ok(None),
            1 => Ok(self.seen.into_iter().next().flatten()),
            _ => Err(Error::MixedSchema {
                schemas: self
                    .seen
                    .into_iter()
                    .map(|s| s.unwrap_or_else(|| "<none>".to_string()))
                    .collect(),
            }),
        }
    }
}

/// Normalize a record, take its embedded schema out, and encode the rest
fn encode_record(record: &Record, slot: &str) -> Result<(Option<String>, String)> {
    let mut normalized = normalize(record)?;
    let schema = match normalized.remove(SCHEMA_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name),
        Some(other) => {
            return Err(Error::TypeMismatch {
                field: format!("{}.{}", slot, SCHEMA_FIELD),
                expected: "string".to_string(),
                actual: other.type_name().to_string(),
            })
        }
    };
    let encoded = serde_json::to_string(&normalized)?;
    Ok((schema, encoded))
}

fn opt<T>(value: Option<T>, f: impl FnOnce(T) -> JsonValue) -> JsonValue {
    value.map(f).unwrap_or(JsonValue::Null)
}

/// Build the envelope for one data-plane call.
///
/// Pure: validates, normalizes and encodes, and never touches the network.
/// Fails before any I/O on conflicting pointer flags, mixed schemas across
/// the payload slots, malformed references, or a non-string `schema` field.
pub fn build(context: &QueryContext, request: &QueryRequest) -> Result<QueryEnvelope> {
    if request.with_pointers && request.with_pointers_metadata {
        return Err(Error::ConflictingOptions {
            reason: "with_pointers and with_pointers_metadata are mutually exclusive".to_string(),
        });
    }

    let mut schemas = SchemaUnity::default();

    let value = match &request.value {
        Some(record) => {
            let (schema, encoded) = encode_record(record, "value")?;
            schemas.observe(schema);
            Some(encoded)
        }
        None => None,
    };

    let bulk_values = match &request.bulk_values {
        Some(records) => {
            let mut encoded = Vec::with_capacity(records.len());
            for (i, record) in records.iter().enumerate() {
                let (schema, text) = encode_record(record, &format!("bulk_values[{}]", i))?;
                schemas.observe(schema);
                encoded.push(JsonValue::String(text));
            }
            Some(encoded)
        }
        None => None,
    };

    let bulk_keys_values = match &request.bulk_keys_values {
        Some(entries) => {
            let mut encoded = Map::with_capacity(entries.len());
            for (key, record) in entries {
                let resolved = key.resolve();
                if encoded.contains_key(&resolved) {
                    return Err(Error::InvalidRequest {
                        reason: format!("bulk_keys_values repeats key '{}'", resolved),
                    });
                }
                let (schema, text) =
                    encode_record(record, &format!("bulk_keys_values[{}]", resolved))?;
                schemas.observe(schema);
                encoded.insert(resolved, JsonValue::String(text));
            }
            Some(encoded)
        }
        None => None,
    };

    let search_criteria = match &request.search_criteria {
        Some(criteria) => Some(serde_json::to_string(&split_search_criteria(criteria)?)?),
        None => None,
    };

    let schema = schemas.resolve()?;
    let limit = request.limit.or(context.limit);
    let kind = request.command.kind();

    trace!(
        command = %request.command,
        bulk_values = request.bulk_values.as_ref().map_or(0, Vec::len),
        bulk_keys = request.bulk_keys.as_ref().map_or(0, Vec::len),
        bulk_keys_values = request.bulk_keys_values.as_ref().map_or(0, Vec::len),
        has_criteria = request.search_criteria.is_some(),
        "building query envelope"
    );

    let creds = &context.credentials;
    let mut envelope = Map::new();
    envelope.insert("schema".into(), opt(schema, JsonValue::String));
    envelope.insert("username".into(), JsonValue::String(creds.username.clone()));
    envelope.insert("password".into(), JsonValue::String(creds.password.clone()));
    envelope.insert("keyspace".into(), JsonValue::String(context.keyspace.clone()));
    envelope.insert("store".into(), JsonValue::String(context.store.clone()));
    envelope.insert("persistent".into(), JsonValue::Bool(context.persistent));
    envelope.insert("distributed".into(), JsonValue::Bool(context.distributed));
    envelope.insert("limit_output".into(), opt(limit, |l| l.to_json()));
    envelope.insert(
        "key".into(),
        opt(request.key.as_ref(), |k| JsonValue::String(k.resolve())),
    );
    envelope.insert("value".into(), opt(value, JsonValue::String));
    envelope.insert(
        "command".into(),
        JsonValue::String(request.command.as_str().to_string()),
    );
    envelope.insert("expire".into(), opt(request.expire_seconds, JsonValue::from));
    envelope.insert("bulk_values".into(), opt(bulk_values, JsonValue::Array));
    envelope.insert(
        "bulk_keys".into(),
        opt(request.bulk_keys.as_ref(), |keys| {
            JsonValue::Array(keys.iter().map(|k| JsonValue::String(k.resolve())).collect())
        }),
    );
    envelope.insert("bulk_keys_values".into(), opt(bulk_keys_values, JsonValue::Object));
    envelope.insert("search_criteria".into(), opt(search_criteria, JsonValue::String));
    envelope.insert("with_pointers".into(), JsonValue::Bool(request.with_pointers));
    envelope.insert(
        "with_pointers_metadata".into(),
        JsonValue::Bool(request.with_pointers_metadata),
    );
    if kind == CommandKind::Subscription {
        envelope.insert("subscribe".into(), JsonValue::Bool(true));
    }

    let bytes = serde_json::to_vec(&JsonValue::Object(envelope))?;
    Ok(QueryEnvelope::new(request.command.as_str(), kind, bytes))
}
