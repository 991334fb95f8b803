//! Data-plane command catalogue.
//!
//! Every command maps to exactly one wire name and one [`CommandKind`].
//! The kind decides which transport state machine handles the request:
//! one reply line, or an indefinite stream of lines.

use std::fmt;
use std::str::FromStr;

/// Wire name of the streaming command
pub const SUBSCRIBE: &str = "subscribe";

/// How the server answers a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Exactly one reply line
    OneShot,
    /// One line per event until the connection is closed or stopped
    Subscription,
}

/// A data-plane command.
///
/// | Command | Wire name | Kind |
/// |---------|-----------|------|
/// | `Set` / `SetBulk` | `set` / `set_bulk` | one-shot |
/// | `Get` / `GetBulk` | `get` / `get_bulk` | one-shot |
/// | `Update` / `UpdateBulk` | `update` / `update_bulk` | one-shot |
/// | `Delete` / `DeleteBulk` | `delete` / `delete_bulk` | one-shot |
/// | `Search` | `search` | one-shot |
/// | `Keys` | `keys` | one-shot |
/// | `Count` | `count` | one-shot |
/// | `Exists` | `exists` | one-shot |
/// | `Subscribe` | `subscribe` | subscription |
/// | `Custom(name)` | `name` | one-shot unless `name` is `subscribe` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Store a value under a key
    Set,
    /// Store many values
    SetBulk,
    /// Fetch one record
    Get,
    /// Fetch many records
    GetBulk,
    /// Modify one record
    Update,
    /// Modify many records
    UpdateBulk,
    /// Remove one record
    Delete,
    /// Remove many records
    DeleteBulk,
    /// Query by search criteria
    Search,
    /// List keys in the keyspace
    Keys,
    /// Count matching records
    Count,
    /// Check for a key
    Exists,
    /// Stream changes to the keyspace
    Subscribe,
    /// A command this catalogue does not know by name
    Custom(String),
}

impl Command {
    /// The wire name
    pub fn as_str(&self) -> &str {
        match self {
            Command::Set => "set",
            Command::SetBulk => "set_bulk",
            Command::Get => "get",
            Command::GetBulk => "get_bulk",
            Command::Update => "update",
            Command::UpdateBulk => "update_bulk",
            Command::Delete => "delete",
            Command::DeleteBulk => "delete_bulk",
            Command::Search => "search",
            Command::Keys => "keys",
            Command::Count => "count",
            Command::Exists => "exists",
            Command::Subscribe => SUBSCRIBE,
            Command::Custom(name) => name,
        }
    }

    /// Which reply shape the server uses for this command
    pub fn kind(&self) -> CommandKind {
        if self.as_str() == SUBSCRIBE {
            CommandKind::Subscription
        } else {
            CommandKind::OneShot
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "set" => Command::Set,
            "set_bulk" => Command::SetBulk,
            "get" => Command::Get,
            "get_bulk" => Command::GetBulk,
            "update" => Command::Update,
            "update_bulk" => Command::UpdateBulk,
            "delete" => Command::Delete,
            "delete_bulk" => Command::DeleteBulk,
            "search" => Command::Search,
            "keys" => Command::Keys,
            "count" => Command::Count,
            "exists" => Command::Exists,
            SUBSCRIBE => Command::Subscribe,
            other => Command::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for cmd in [
            Command::Set,
            Command::SetBulk,
            Command::Get,
            Command::GetBulk,
            Command::Update,
            Command::UpdateBulk,
            Command::Delete,
            Command::DeleteBulk,
            Command::Search,
            Command::Keys,
            Command::Count,
            Command::Exists,
            Command::Subscribe,
        ] {
            let parsed: Command = cmd.as_str().parse().unwrap();
            assert_eq!(parsed, cmd);
        }
    }

    #[test]
    fn test_only_subscribe_streams() {
        assert_eq!(Command::Subscribe.kind(), CommandKind::Subscription);
        assert_eq!(Command::Search.kind(), CommandKind::OneShot);
        assert_eq!(
            Command::Custom("subscribe".into()).kind(),
            CommandKind::Subscription
        );
        assert_eq!(Command::Custom("vacuum".into()).kind(), CommandKind::OneShot);
    }
}
