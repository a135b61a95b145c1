use crate::config::CacheConfig;
use crate::core::{CacheError, Result};
use crate::facade::flusher::{CacheFlusher, spawn_flusher};
use crate::facade::UuidCache;
use crate::storage::{CacheStore, FileStore};
use std::sync::Arc;
use tracing::info;

/// A cache plus its periodic flusher, with an explicit open/shutdown
/// lifecycle for hosts that deliver logins and a shutdown signal.
///
/// Must be opened inside a tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use uuidcache::{CacheConfig, CacheService};
/// use uuid::Uuid;
///
/// # tokio_test::block_on(async {
/// let service = CacheService::open(CacheConfig::in_dir("./data")).unwrap();
/// service.cache().on_login(Uuid::new_v4(), "Annika").unwrap();
/// service.shutdown().await.unwrap();
/// # });
/// ```
pub struct CacheService {
    cache: Arc<UuidCache>,
    flusher: Option<CacheFlusher>,
    flush_on_shutdown: bool,
}

impl CacheService {
    /// Open the cache file named by `config` and start flushing it.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let store = FileStore::new(&config.path);
        info!("Opening identity cache at {}", config.path.display());
        Self::with_store(store, config)
    }

    /// Same as [`open`](Self::open) but over any store. `config.path` is ignored.
    pub fn with_store(store: impl CacheStore + 'static, config: CacheConfig) -> Result<Self> {
        let cache = Arc::new(UuidCache::open(store)?);
        let flusher = spawn_flusher(cache.clone(), config.flush_interval);
        Ok(Self {
            cache,
            flusher: Some(flusher),
            flush_on_shutdown: config.flush_on_shutdown,
        })
    }

    pub fn cache(&self) -> &Arc<UuidCache> {
        &self.cache
    }

    /// Stop the flusher, then write any unsaved changes.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(flusher) = self.flusher.take() {
            flusher.stop().await?;
        }

        if self.flush_on_shutdown {
            let cache = self.cache.clone();
            tokio::task::spawn_blocking(move || cache.flush())
                .await
                .map_err(|err| CacheError::Worker(format!("shutdown flush: {}", err)))??;
        }

        info!("Identity cache shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_shutdown_flushes() {
        let store = MemoryStore::new();
        let config = CacheConfig::default().flush_interval(Duration::from_secs(3600));
        let service = CacheService::with_store(store.clone(), config).unwrap();

        service.cache().on_login(Uuid::from_u128(1), "Alice").unwrap();
        assert_eq!(store.write_count(), 0);

        service.shutdown().await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_without_final_flush() {
        let store = MemoryStore::new();
        let config = CacheConfig::default()
            .flush_interval(Duration::from_secs(3600))
            .flush_on_shutdown(false);
        let service = CacheService::with_store(store.clone(), config).unwrap();

        service.cache().on_login(Uuid::from_u128(1), "Alice").unwrap();
        service.shutdown().await.unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_reports_failed_flush() {
        let store = MemoryStore::new();
        let config = CacheConfig::default().flush_interval(Duration::from_secs(3600));
        let service = CacheService::with_store(store.clone(), config).unwrap();

        service.cache().on_login(Uuid::from_u128(1), "Alice").unwrap();
        store.set_fail_writes(true);
        assert!(service.shutdown().await.is_err());
    }
}
