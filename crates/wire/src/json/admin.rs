//! Administrative envelopes
//!
//! Store, owner and permission management does not use the data-plane
//! envelope. The request is a flat list of option tokens, alternating
//! option name and option value, sent alongside the credentials:
//!
//! ```text
//! {"raw": ["store", "inventory", "add_owner", "bob"], "credentials": ["admin", "pw"]}
//! ```

use serde_json::{json, Value as JsonValue};
use tessera_core::{Error, Result};
use tracing::trace;

use crate::command::CommandKind;
use crate::context::Credentials;
use crate::json::envelope::QueryEnvelope;

/// An ordered list of administrative option pairs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminRequest {
    options: Vec<(String, String)>,
}

impl AdminRequest {
    /// Empty request; add options with [`AdminRequest::option`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one option pair
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    /// Create a store
    pub fn create_store(store: impl Into<String>) -> Self {
        Self::new().option("create_store", store)
    }

    /// Drop a store and everything in it
    pub fn drop_store(store: impl Into<String>) -> Self {
        Self::new().option("drop_store", store)
    }

    /// Add an owner to a store
    pub fn add_owner(store: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new().option("store", store).option("add_owner", user)
    }

    /// Remove an owner from a store
    pub fn remove_owner(store: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new().option("store", store).option("remove_owner", user)
    }

    /// Grant `permission` on a store to a user
    pub fn grant_permission(
        store: impl Into<String>,
        user: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        Self::new()
            .option("store", store)
            .option("user", user)
            .option("grant", permission)
    }

    /// Revoke `permission` on a store from a user
    pub fn revoke_permission(
        store: impl Into<String>,
        user: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        Self::new()
            .option("store", store)
            .option("user", user)
            .option("revoke", permission)
    }

    /// Option pairs in order
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Flattened `[name, value, name, value, ...]` token list
    pub fn tokens(&self) -> Vec<String> {
        self.options
            .iter()
            .flat_map(|(name, value)| [name.clone(), value.clone()])
            .collect()
    }

    /// Encode with `credentials`. Admin replies are always a single line.
    pub fn encode(&self, credentials: &Credentials) -> Result<QueryEnvelope> {
        // The last option names the action; earlier ones address it
        let action = match self.options.last() {
            Some((name, _)) => name.clone(),
            None => {
                return Err(Error::InvalidRequest {
                    reason: "administrative request has no options".to_string(),
                })
            }
        };
        let raw: Vec<JsonValue> = self.tokens().into_iter().map(JsonValue::String).collect();
        let envelope = json!({
            "raw": raw,
            "credentials": [credentials.username, credentials.password],
        });
        trace!(action = %action, options = self.options.len(), "building admin envelope");
        let bytes = serde_json::to_vec(&envelope)?;
        Ok(QueryEnvelope::new(action, CommandKind::OneShot, bytes))
    }
}
