use crate::core::{CacheError, Result};
use crate::facade::UuidCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, warn};

const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Background worker that flushes the cache on a fixed interval.
pub struct CacheFlusher {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl CacheFlusher {
    /// Signals the worker to stop and waits for it to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle
                .await
                .map_err(|err| CacheError::Worker(format!("flusher join: {}", err)))?;
        }
        Ok(())
    }
}

impl Drop for CacheFlusher {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}

/// Spawns a flusher on the current tokio runtime.
///
/// A failed tick is logged and retried on the next one; the worker only
/// exits when stopped.
pub fn spawn_flusher(cache: Arc<UuidCache>, interval: Duration) -> CacheFlusher {
    let interval = interval.max(MIN_FLUSH_INTERVAL);
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let join_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    break;
                }
                _ = sleep(interval) => {
                    let cache = cache.clone();
                    match tokio::task::spawn_blocking(move || cache.flush()).await {
                        Ok(Ok(true)) => debug!("Periodic flush wrote identity cache"),
                        Ok(Ok(false)) => {}
                        Ok(Err(err)) => warn!("Periodic flush failed, will retry: {}", err),
                        Err(err) => error!("Periodic flush task failed: {}", err),
                    }
                }
            }
        }
    });

    CacheFlusher {
        stop_tx: Some(stop_tx),
        join_handle: Some(join_handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_flusher_writes_dirty_cache() {
        let store = MemoryStore::new();
        let cache = Arc::new(UuidCache::open(store.clone()).unwrap());
        let flusher = spawn_flusher(cache.clone(), Duration::from_millis(20));

        cache.on_login(Uuid::from_u128(1), "Alice").unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        flusher.stop().await.unwrap();

        assert_eq!(store.write_count(), 1);
        assert!(!cache.is_dirty().unwrap());
    }

    #[tokio::test]
    async fn test_flusher_retries_after_failure() {
        let store = MemoryStore::new();
        let cache = Arc::new(UuidCache::open(store.clone()).unwrap());
        store.set_fail_writes(true);
        let flusher = spawn_flusher(cache.clone(), Duration::from_millis(20));

        cache.on_login(Uuid::from_u128(1), "Alice").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.write_count(), 0);
        assert!(cache.is_dirty().unwrap());

        store.set_fail_writes(false);
        tokio::time::sleep(Duration::from_millis(150)).await;
        flusher.stop().await.unwrap();

        assert_eq!(store.write_count(), 1);
        assert!(!cache.is_dirty().unwrap());
    }
}
