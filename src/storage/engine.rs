use crate::core::{RawEntry, Result};

/// Backing store trait - allows pluggable persistence backends
///
/// A store only moves raw entries in and out. Parsing tokens and culling
/// duplicates is the gateway's job.
pub trait CacheStore: Send + Sync {
    /// Read every persisted entry. A store that was never written is empty.
    fn load(&self) -> Result<Vec<RawEntry>>;

    /// Replace the store contents wholesale with `entries`.
    fn save(&self, entries: &[RawEntry]) -> Result<()>;
}
