//! Socket transport for the Tessera client
//!
//! A [`Transport`] opens one TCP connection per logical query, writes one
//! newline-terminated envelope, and then either reads exactly one reply
//! line or streams every line to a handler until the server closes the
//! connection or the caller stops it.
//!
//! Transport errors carry the endpoint and are never retried here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod subscription;
pub mod transport;

#[cfg(test)]
mod mock;

pub use config::{TransportConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
pub use error::{Result, TransportError};
pub use subscription::{StopHandle, StreamEnd, StreamEvent, Subscription};
pub use transport::{Dispatch, Transport, TransportState};
