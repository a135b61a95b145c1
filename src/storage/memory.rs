use crate::core::{CacheError, RawEntry, Result};
use crate::storage::engine::CacheStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process store. Clones share the same contents and counters, so a test
/// can keep a handle while the cache owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Vec<RawEntry>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<RawEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            ..Self::default()
        }
    }

    /// Current contents, as last saved.
    pub fn entries(&self) -> Result<Vec<RawEntry>> {
        Ok(self.entries.lock()?.clone())
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following save fail with an I/O error until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Vec<RawEntry>> {
        self.entries()
    }

    fn save(&self, entries: &[RawEntry]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Io("write refused by memory store".to_string()));
        }
        *self.entries.lock()? = entries.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(&[RawEntry::new("a", Some("A"))]).unwrap();

        assert_eq!(handle.write_count(), 1);
        assert_eq!(handle.load().unwrap(), vec![RawEntry::new("a", Some("A"))]);
    }

    #[test]
    fn test_failed_write_keeps_contents() {
        let store = MemoryStore::with_entries(vec![RawEntry::new("a", Some("A"))]);
        store.set_fail_writes(true);

        assert!(matches!(store.save(&[]), Err(CacheError::Io(_))));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.entries().unwrap().len(), 1);
    }
}
