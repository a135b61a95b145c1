// ============================================================================
// uuidcache Library
// ============================================================================

//! Two-way cache between player UUIDs and their current names.
//!
//! The UUID is authoritative. Names are case-preserving, looked up
//! case-insensitively, and may move between players: a rename releases the
//! old name, and two players can even swap names between logins without
//! either name ever pointing at two players.
//!
//! ```
//! use uuidcache::{MemoryStore, UuidCache};
//! use uuid::Uuid;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = UuidCache::open(MemoryStore::new())?;
//! let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
//!
//! cache.on_login(u1, "Alice")?;
//! cache.on_login(u2, "Bob")?;
//!
//! // Swap
//! cache.on_login(u1, "Bob")?;
//! cache.on_login(u2, "Alice")?;
//!
//! assert_eq!(cache.uuid_exact("bob")?, Some(u1));
//! assert_eq!(cache.name(&u2)?.as_deref(), Some("Alice"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod index;
pub mod storage;

pub use config::CacheConfig;
pub use crate::core::{CacheError, IdentityRecord, RawEntry, Result, parse_token};
pub use facade::{CacheFlusher, CacheService, CacheStats, UuidCache, spawn_flusher};
pub use index::{IdentityIndex, Inconsistency};
pub use storage::{CacheStore, FileStore, LoadReport, MemoryStore, PersistenceGateway};
