use crate::core::{CacheError, Result};
use uuid::Uuid;

/// State of a token the cache has observed.
///
/// A token that was never observed has no record at all. Once a record
/// exists it is never removed; it only moves between `Live` and `Tombstoned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRecord {
    /// The token currently owns this name (canonical case).
    Live(String),
    /// The token is known but owns no name.
    Tombstoned,
}

impl IdentityRecord {
    pub fn name(&self) -> Option<&str> {
        match self {
            IdentityRecord::Live(name) => Some(name),
            IdentityRecord::Tombstoned => None,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, IdentityRecord::Live(_))
    }
}

/// One persisted entry, before the token has been parsed or checked.
///
/// `name == None` is a tombstoned record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub token: String,
    pub name: Option<String>,
}

impl RawEntry {
    pub fn new(token: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            token: token.into(),
            name: name.map(str::to_string),
        }
    }
}

/// Case folding used for name-record keys.
#[inline]
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Parse the textual form of an identity token.
pub fn parse_token(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| CacheError::InvalidToken(raw.to_string()))
}
