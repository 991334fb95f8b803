//! Temporal conditions
//!
//! A temporal condition is exactly one of:
//! - an absolute instant, sent as a bare string
//! - a `[start, end]` range, sent as `{"range_timestamp": [start, end]}`
//! - a lower bound, sent as `{"after_timestamp": t}`
//! - an upper bound, sent as `{"before_timestamp": t}`
//!
//! Instants are carried as text. The `chrono` constructors write RFC 3339
//! in UTC; callers talking to a server with another format can build the
//! variants directly.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tessera_core::TemporalCondition;
//!
//! let t = TemporalCondition::after(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
//! assert_eq!(t.to_json(), serde_json::json!({"after_timestamp": "2024-01-02T03:04:05Z"}));
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::Value;

/// Discriminant name for ranges
pub const RANGE_TIMESTAMP: &str = "range_timestamp";
/// Discriminant name for lower bounds
pub const AFTER_TIMESTAMP: &str = "after_timestamp";
/// Discriminant name for upper bounds
pub const BEFORE_TIMESTAMP: &str = "before_timestamp";

/// A timestamp or time-range predicate with exactly one discriminant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalCondition {
    /// Absolute instant
    At(String),
    /// Inclusive range
    Range {
        /// Range start
        start: String,
        /// Range end
        end: String,
    },
    /// Strictly after an instant
    After(String),
    /// Strictly before an instant
    Before(String),
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl TemporalCondition {
    /// An absolute instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        TemporalCondition::At(rfc3339(instant))
    }

    /// A range; fails if `end` precedes `start`
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidTemporal {
                reason: format!("range ends ({}) before it starts ({})", end, start),
            });
        }
        Ok(TemporalCondition::Range {
            start: rfc3339(start),
            end: rfc3339(end),
        })
    }

    /// A lower bound
    pub fn after(instant: DateTime<Utc>) -> Self {
        TemporalCondition::After(rfc3339(instant))
    }

    /// An upper bound
    pub fn before(instant: DateTime<Utc>) -> Self {
        TemporalCondition::Before(rfc3339(instant))
    }

    /// Build from optional parts, exactly one of which must be set
    pub fn from_parts(
        timestamp: Option<String>,
        range: Option<(String, String)>,
        after: Option<String>,
        before: Option<String>,
    ) -> Result<Self> {
        match (timestamp, range, after, before) {
            (Some(t), None, None, None) => Ok(TemporalCondition::At(t)),
            (None, Some((start, end)), None, None) => Ok(TemporalCondition::Range { start, end }),
            (None, None, Some(t), None) => Ok(TemporalCondition::After(t)),
            (None, None, None, Some(t)) => Ok(TemporalCondition::Before(t)),
            (t, r, a, b) => {
                let set = [t.is_some(), r.is_some(), a.is_some(), b.is_some()]
                    .iter()
                    .filter(|set| **set)
                    .count();
                Err(Error::InvalidTemporal {
                    reason: format!("exactly one discriminant must be set, found {}", set),
                })
            }
        }
    }

    /// Name of the active discriminant (`None` for a bare instant)
    pub fn discriminant(&self) -> Option<&'static str> {
        match self {
            TemporalCondition::At(_) => None,
            TemporalCondition::Range { .. } => Some(RANGE_TIMESTAMP),
            TemporalCondition::After(_) => Some(AFTER_TIMESTAMP),
            TemporalCondition::Before(_) => Some(BEFORE_TIMESTAMP),
        }
    }

    /// The wire form as a record value
    pub fn to_value(&self) -> Value {
        match self {
            TemporalCondition::At(t) => Value::String(t.clone()),
            TemporalCondition::Range { start, end } => Value::Object(Record::new().with(
                RANGE_TIMESTAMP,
                Value::Array(vec![Value::String(start.clone()), Value::String(end.clone())]),
            )),
            TemporalCondition::After(t) => {
                Value::Object(Record::new().with(AFTER_TIMESTAMP, t.as_str()))
            }
            TemporalCondition::Before(t) => {
                Value::Object(Record::new().with(BEFORE_TIMESTAMP, t.as_str()))
            }
        }
    }

    /// The wire form as JSON
    pub fn to_json(&self) -> serde_json::Value {
        self.to_value().to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn instant(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_at_is_bare_string() {
        let t = TemporalCondition::at(instant(9));
        assert_eq!(t.to_json(), json!("2024-05-01T09:00:00Z"));
        assert_eq!(t.discriminant(), None);
    }

    #[test]
    fn test_range_wire_form() {
        let t = TemporalCondition::range(instant(1), instant(2)).unwrap();
        assert_eq!(
            t.to_json(),
            json!({"range_timestamp": ["2024-05-01T01:00:00Z", "2024-05-01T02:00:00Z"]})
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = TemporalCondition::range(instant(3), instant(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidTemporal { .. }));
    }

    #[test]
    fn test_bounds_wire_form() {
        assert_eq!(
            TemporalCondition::Before("x".into()).to_json(),
            json!({"before_timestamp": "x"})
        );
        assert_eq!(
            TemporalCondition::After("y".into()).to_json(),
            json!({"after_timestamp": "y"})
        );
    }

    #[test]
    fn test_from_parts_exactly_one() {
        let ok = TemporalCondition::from_parts(None, None, Some("t".into()), None).unwrap();
        assert_eq!(ok, TemporalCondition::After("t".into()));

        let none = TemporalCondition::from_parts(None, None, None, None);
        assert!(matches!(none, Err(Error::InvalidTemporal { .. })));

        let two = TemporalCondition::from_parts(
            Some("a".into()),
            None,
            None,
            Some("b".into()),
        );
        assert!(matches!(two, Err(Error::InvalidTemporal { .. })));
    }
}
