//! Error types for request construction
//!
//! Everything that can go wrong before a request touches the network lives
//! here: schema validation, limit and option checks, and normalization of
//! references and temporal conditions. We use `thiserror` for the `Display`
//! and `Error` implementations.
//!
//! None of these errors are retryable. The caller has to fix the call.

use thiserror::Error;

/// Result type alias for request construction
pub type Result<T> = std::result::Result<T, Error>;

/// Validation and normalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ==================== Schema Validation ====================
    /// A field declared by the schema was not supplied
    #[error("missing field: {field}")]
    MissingField {
        /// Declared field that was absent
        field: String,
    },

    /// A supplied field is not declared by the schema
    #[error("unexpected field: {field}")]
    ExtraField {
        /// Undeclared field that was present
        field: String,
    },

    /// A field value does not have the declared type
    #[error("type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Offending field
        field: String,
        /// Declared type (or types, for a disjunction)
        expected: String,
        /// Runtime type of the supplied value
        actual: String,
    },

    /// A schema descriptor could not be parsed
    #[error("invalid schema: {reason}")]
    InvalidSchema {
        /// What was wrong with the descriptor
        reason: String,
    },

    // ==================== Request Validation ====================
    /// A bulk batch mixes records declaring different schemas
    #[error("mixed schemas in bulk batch: {}", schemas.join(", "))]
    MixedSchema {
        /// Distinct schema names found in the batch, in first-seen order
        schemas: Vec<String>,
    },

    /// A result-limit window was not a `[start, stop]` pair
    #[error("invalid limit: {reason}")]
    InvalidLimit {
        /// What was wrong with the limit
        reason: String,
    },

    /// Mutually exclusive options were requested together
    #[error("conflicting options: {reason}")]
    ConflictingOptions {
        /// Which options conflict
        reason: String,
    },

    /// A request is structurally unusable (e.g. an empty admin command)
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: String,
    },

    /// A connection URI could not be parsed
    #[error("invalid connection uri: {reason}")]
    InvalidUri {
        /// What was wrong with the URI
        reason: String,
    },

    // ==================== Normalization ====================
    /// A temporal condition did not have exactly one discriminant
    #[error("invalid timestamp condition: {reason}")]
    InvalidTemporal {
        /// What was wrong with the condition
        reason: String,
    },

    /// A reference or pointer entry was malformed
    #[error("cannot normalize field '{field}': {reason}")]
    Normalization {
        /// Offending field (`pointers.<name>` for pointer entries)
        field: String,
        /// What was wrong with the value
        reason: String,
    },

    // ==================== Encoding ====================
    /// JSON encoding failed
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying encoder message
        reason: String,
    },
}

impl Error {
    /// True for schema, limit, option and request shape errors
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Error::InvalidTemporal { .. } | Error::Normalization { .. } | Error::Serialization { .. }
        )
    }

    /// True for malformed reference or temporal structures
    pub fn is_normalization(&self) -> bool {
        matches!(self, Error::InvalidTemporal { .. } | Error::Normalization { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
