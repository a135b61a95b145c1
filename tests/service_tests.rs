//! Lifecycle tests for the periodic flusher and service shutdown
//! Run with: cargo test --test service_tests

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;
use uuidcache::{CacheConfig, CacheService, UuidCache};

#[tokio::test]
async fn test_service_persists_across_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig::in_dir(temp_dir.path()).flush_interval(Duration::from_secs(3600));
    let player = Uuid::new_v4();

    let service = CacheService::open(config.clone()).unwrap();
    service.cache().on_login(player, "Annika").unwrap();
    service.shutdown().await.unwrap();

    let service = CacheService::open(config).unwrap();
    assert_eq!(service.cache().uuid("ann").unwrap(), Some(player));
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_periodic_flush_reaches_disk() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig::in_dir(temp_dir.path()).flush_interval(Duration::from_millis(20));
    let player = Uuid::new_v4();

    let service = CacheService::open(config.clone()).unwrap();
    service.cache().on_login(player, "Anton").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!service.cache().is_dirty().unwrap());
    let on_disk = UuidCache::open_file(&config.path).unwrap();
    assert_eq!(on_disk.uuid_exact("anton").unwrap(), Some(player));

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_logins_keep_index_consistent() {
    let temp_dir = TempDir::new().unwrap();
    let config = CacheConfig::in_dir(temp_dir.path()).flush_interval(Duration::from_millis(10));
    let service = CacheService::open(config).unwrap();
    let names = ["alice", "Alice", "bob", "carol"];

    let mut handles = vec![];
    for task_id in 0..8u128 {
        let cache: Arc<UuidCache> = service.cache().clone();
        handles.push(tokio::spawn(async move {
            for i in 0..200usize {
                let player = Uuid::from_u128(task_id % 3);
                cache.on_login(player, names[(i + task_id as usize) % names.len()]).unwrap();
                if i % 17 == 0 {
                    cache.untrack(player).unwrap();
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert!(service.cache().verify().unwrap().is_empty());
    service.shutdown().await.unwrap();
}
