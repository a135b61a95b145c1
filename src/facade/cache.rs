use crate::core::{IdentityRecord, Result};
use crate::index::{IdentityIndex, Inconsistency};
use crate::storage::{CacheStore, FileStore, LoadReport, PersistenceGateway};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Thread-safe handle over the identity index and its backing store.
///
/// Every operation takes the same lock for its full duration, so the
/// half-cleared states of a rename are never visible to another caller.
///
/// # Examples
///
/// ```
/// use uuidcache::{MemoryStore, UuidCache};
/// use uuid::Uuid;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = UuidCache::open(MemoryStore::new())?;
/// let player = Uuid::new_v4();
///
/// cache.on_login(player, "Annika")?;
/// assert_eq!(cache.uuid("ann")?, Some(player));
/// assert_eq!(cache.name(&player)?.as_deref(), Some("Annika"));
///
/// assert!(cache.flush()?);
/// # Ok(())
/// # }
/// ```
pub struct UuidCache {
    index: Mutex<IdentityIndex>,
    gateway: PersistenceGateway,
    report: LoadReport,
}

/// Point-in-time counts for a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub known: usize,
    pub live: usize,
    pub tombstoned: usize,
    pub dirty: bool,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} known ({} live, {} tombstoned){}",
            self.known,
            self.live,
            self.tombstoned,
            if self.dirty { ", unsaved changes" } else { "" }
        )
    }
}

impl UuidCache {
    /// Load the cache from `store`.
    pub fn open(store: impl CacheStore + 'static) -> Result<Self> {
        let gateway = PersistenceGateway::new(store);
        let (index, report) = gateway.load()?;
        if report.culled() > 0 {
            info!("Identity cache loaded with culled entries: {}", report);
        }
        Ok(Self {
            index: Mutex::new(index),
            gateway,
            report,
        })
    }

    /// Load the cache from a JSON file. A missing file starts empty.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(FileStore::new(path))
    }

    /// What the initial load kept and culled.
    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get the name associated with this UUID.
    pub fn name(&self, token: &Uuid) -> Result<Option<String>> {
        Ok(self.index.lock()?.name(token).map(str::to_string))
    }

    /// Get the UUID associated with this name. Unique partial names are accepted.
    pub fn uuid(&self, name: &str) -> Result<Option<Uuid>> {
        Ok(self.index.lock()?.uuid(name))
    }

    /// Get the UUID associated with this name. Partial names are NOT accepted.
    pub fn uuid_exact(&self, name: &str) -> Result<Option<Uuid>> {
        Ok(self.index.lock()?.uuid_exact(name))
    }

    pub fn record(&self, token: &Uuid) -> Result<Option<IdentityRecord>> {
        Ok(self.index.lock()?.record(token).cloned())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let index = self.index.lock()?;
        Ok(CacheStats {
            known: index.len(),
            live: index.live_count(),
            tombstoned: index.tombstoned_count(),
            dirty: index.is_dirty(),
        })
    }

    pub fn is_dirty(&self) -> Result<bool> {
        Ok(self.index.lock()?.is_dirty())
    }

    pub fn verify(&self) -> Result<Vec<Inconsistency>> {
        Ok(self.index.lock()?.verify())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Merge a player login. Returns `true` if the cache changed.
    pub fn on_login(&self, token: Uuid, name: &str) -> Result<bool> {
        let changed = self.index.lock()?.reconcile(token, name);
        if changed {
            debug!("Cached {} as \"{}\"", token, name);
        }
        Ok(changed)
    }

    /// Release the name held by `token`. The token itself stays known.
    pub fn untrack(&self, token: Uuid) -> Result<bool> {
        let changed = self.index.lock()?.untrack(token);
        if changed {
            debug!("Untracked {}", token);
        }
        Ok(changed)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the cache if it changed since the last successful save.
    ///
    /// Returns `true` if a write happened. On failure the cache stays dirty
    /// so the next flush retries.
    pub fn flush(&self) -> Result<bool> {
        let mut index = self.index.lock()?;
        if !index.is_dirty() {
            return Ok(false);
        }

        match self.gateway.save(&index) {
            Ok(()) => {
                index.mark_clean();
                debug!("Flushed identity cache ({} tokens)", index.len());
                Ok(true)
            }
            Err(err) => {
                error!("Cannot save player UUID cache! {}", err);
                Err(err)
            }
        }
    }

    /// Final flush before the cache is dropped.
    pub fn close(self) -> Result<()> {
        self.flush()?;
        Ok(())
    }
}
