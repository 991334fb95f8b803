//! Transport configuration

use std::time::Duration;

/// Default bound on establishing a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on waiting for a one-shot reply
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Where to connect and how long to wait.
///
/// The read timeout applies to one-shot replies only. Subscriptions wait
/// indefinitely between lines.
///
/// ```
/// use std::time::Duration;
/// use tessera_transport::TransportConfig;
///
/// let config = TransportConfig::new("db.local", 7000)
///     .connect_timeout(Duration::from_secs(2));
/// assert_eq!(config.endpoint(), "db.local:7000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Bound on connecting
    pub connect_timeout: Duration,
    /// Bound on a one-shot reply
    pub read_timeout: Duration,
}

impl TransportConfig {
    /// Config for `host:port` with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        TransportConfig {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the one-shot read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// `host:port`, for logs and error messages
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::new("h", 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_overrides() {
        let config = TransportConfig::new("h", 1)
            .connect_timeout(Duration::from_millis(5))
            .read_timeout(Duration::from_millis(7));
        assert_eq!(config.connect_timeout, Duration::from_millis(5));
        assert_eq!(config.read_timeout, Duration::from_millis(7));
    }
}
