//! Transport errors
//!
//! Every variant names the endpoint. Nothing here is retried internally;
//! [`TransportError::is_timeout`] and [`TransportError::is_connect`] give
//! callers what they need to pick a retry policy.

use std::io;

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failure talking to the server
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, unreachable host, or name resolution failure
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        /// Underlying error
        source: io::Error,
    },

    /// Connecting took longer than the configured bound
    #[error("timed out connecting to {host}:{port} after {timeout_ms}ms")]
    ConnectTimeout {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        /// The bound that elapsed
        timeout_ms: u64,
    },

    /// No reply line within the configured bound
    #[error("no reply from {host}:{port} within {timeout_ms}ms")]
    ReadTimeout {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        /// The bound that elapsed
        timeout_ms: u64,
    },

    /// Reset or other socket failure after connecting
    #[error("I/O error on {host}:{port}: {source}")]
    Io {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        /// Underlying error
        source: io::Error,
    },

    /// The server closed the connection before replying
    #[error("connection to {host}:{port} closed before a reply was received")]
    Closed {
        /// Server host
        host: String,
        /// Server port
        port: u16,
    },
}

impl TransportError {
    /// The endpoint the failure happened on
    pub fn endpoint(&self) -> (&str, u16) {
        match self {
            TransportError::Connect { host, port, .. }
            | TransportError::ConnectTimeout { host, port, .. }
            | TransportError::ReadTimeout { host, port, .. }
            | TransportError::Io { host, port, .. }
            | TransportError::Closed { host, port } => (host, *port),
        }
    }

    /// Connect or read bound elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectTimeout { .. } | TransportError::ReadTimeout { .. }
        )
    }

    /// Failed before the request was sent
    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            TransportError::Connect { .. } | TransportError::ConnectTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_display() {
        let err = TransportError::ReadTimeout {
            host: "db".into(),
            port: 7000,
            timeout_ms: 250,
        };
        assert_eq!(err.endpoint(), ("db", 7000));
        assert!(err.is_timeout());
        assert!(!err.is_connect());
        assert_eq!(err.to_string(), "no reply from db:7000 within 250ms");
    }

    #[test]
    fn test_connect_classification() {
        let err = TransportError::Connect {
            host: "db".into(),
            port: 1,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(err.is_connect());
        assert!(!err.is_timeout());
        assert!(err.to_string().starts_with("failed to connect to db:1"));
    }
}
