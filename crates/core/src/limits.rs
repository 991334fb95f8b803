//! Result-limit windows
//!
//! A limit is always a `[start, stop]` pair or absent entirely. A partial
//! limit is a validation error, not a default.
//!
//! ```
//! use tessera_core::Limit;
//!
//! assert!(Limit::try_from(&[5u64][..]).is_err());
//! let limit = Limit::try_from(&[5u64, 10][..]).unwrap();
//! assert_eq!(limit.to_json(), serde_json::json!({"start": 5, "stop": 10}));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A `[start, stop]` window over query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// First result position
    pub start: u64,
    /// Position to stop at
    pub stop: u64,
}

impl Limit {
    /// Create a limit window
    pub const fn new(start: u64, stop: u64) -> Self {
        Limit { start, stop }
    }

    /// Wire form: `{"start": .., "stop": ..}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({"start": self.start, "stop": self.stop})
    }
}

impl TryFrom<&[u64]> for Limit {
    type Error = Error;

    fn try_from(pair: &[u64]) -> Result<Self, Self::Error> {
        match pair {
            [start, stop] => Ok(Limit::new(*start, *stop)),
            other => Err(Error::InvalidLimit {
                reason: format!(
                    "expected a [start, stop] pair, got {} element(s)",
                    other.len()
                ),
            }),
        }
    }
}

impl TryFrom<Vec<u64>> for Limit {
    type Error = Error;

    fn try_from(pair: Vec<u64>) -> Result<Self, Self::Error> {
        Limit::try_from(pair.as_slice())
    }
}

impl From<(u64, u64)> for Limit {
    fn from((start, stop): (u64, u64)) -> Self {
        Limit::new(start, stop)
    }
}
