//! Error conversion from the lower crates.
//!
//! Errors keep their variant and fields; the client only tags which layer
//! produced them.

use crate::Error;
use tessera_core::Error as RequestError;
use tessera_transport::TransportError;

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::Request(err)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::config(format!("failed to parse TOML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_keeps_fields() {
        let err: Error = RequestError::MissingField {
            field: "name".into(),
        }
        .into();
        assert!(err.is_request());
        match err {
            Error::Request(RequestError::MissingField { field }) => assert_eq!(field, "name"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_timeout_classified() {
        let err: Error = TransportError::ConnectTimeout {
            host: "db".into(),
            port: 1,
            timeout_ms: 10,
        }
        .into();
        assert!(err.is_transport());
        assert!(err.is_timeout());
        assert!(err.to_string().contains("db:1"));
    }

    #[test]
    fn test_toml_error_becomes_config() {
        let err: Error = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, Error::Config { .. }));
    }
}
