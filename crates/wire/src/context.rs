//! Connection context carried by every data-plane envelope.

use std::fmt;

use tessera_core::Limit;

/// Account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Addressing, credentials and flags shared by the requests of one caller.
///
/// ```
/// use tessera_wire::{Credentials, QueryContext};
///
/// let ctx = QueryContext::new("inventory", "items", Credentials::new("app", "pw"))
///     .persistent(true);
/// assert_eq!(ctx.keyspace, "items");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// Store (tenant) name
    pub store: String,
    /// Keyspace within the store
    pub keyspace: String,
    /// Account credentials
    pub credentials: Credentials,
    /// Ask the server to persist writes
    pub persistent: bool,
    /// Ask the server to distribute writes
    pub distributed: bool,
    /// Default result-limit window; a request's own limit takes precedence
    pub limit: Option<Limit>,
}

impl QueryContext {
    /// Create a context with both flags off and no default limit
    pub fn new(
        store: impl Into<String>,
        keyspace: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        QueryContext {
            store: store.into(),
            keyspace: keyspace.into(),
            credentials,
            persistent: false,
            distributed: false,
            limit: None,
        }
    }

    /// Set the persistence flag
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Set the distribution flag
    pub fn distributed(mut self, distributed: bool) -> Self {
        self.distributed = distributed;
        self
    }

    /// Set the default limit window
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same context, different keyspace
    pub fn with_keyspace(&self, keyspace: impl Into<String>) -> Self {
        QueryContext {
            keyspace: keyspace.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("app", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("app"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_with_keyspace_keeps_rest() {
        let ctx = QueryContext::new("s", "a", Credentials::new("u", "p"))
            .distributed(true)
            .limit(Limit::new(0, 5));
        let other = ctx.with_keyspace("b");
        assert_eq!(other.keyspace, "b");
        assert_eq!(other.store, "s");
        assert!(other.distributed);
        assert_eq!(other.limit, Some(Limit::new(0, 5)));
    }
}
