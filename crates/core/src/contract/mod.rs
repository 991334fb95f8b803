//! Typed values with a dedicated wire form
//!
//! - `reference`: cross-keyspace pointers, sent as `[keyspace, key]`
//! - `timestamp`: temporal conditions, sent as a bare instant or a
//!   single-key object naming the discriminant

pub mod reference;
pub mod timestamp;

pub use reference::Reference;
pub use timestamp::TemporalCondition;
