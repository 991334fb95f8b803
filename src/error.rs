//! Client errors.
//!
//! Every failure a [`Client`](crate::Client) call can produce:
//!
//! | Category | Variant | Retry? |
//! |----------|---------|--------|
//! | Validation / normalization | `Request` | No, fix the call |
//! | Connection, timeout, reset | `Transport` | Caller's choice |
//! | Configuration | `Config` | No |
//!
//! Conversions from the lower crates live in `convert.rs`.

use tessera_core::Error as RequestError;
use tessera_transport::TransportError;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was rejected before any I/O
    #[error("invalid request: {0}")]
    Request(RequestError),

    /// Talking to the server failed
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

impl Error {
    /// Rejected before any network I/O
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request(_))
    }

    /// Failed on the network
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// A connect or read bound elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_timeout())
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }
}
