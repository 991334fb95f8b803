//! JSON encoding of requests and decoding of replies

pub mod admin;
pub mod decode;
pub mod envelope;

pub use admin::AdminRequest;
pub use decode::{decode, decode_line, is_opaque_identifier, OPAQUE_DIGITS_THRESHOLD};
pub use envelope::{build, has_subscription_marker, QueryEnvelope, QueryRequest, SUBSCRIPTION_MARKER};
