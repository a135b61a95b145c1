pub mod cache;
pub mod flusher;
pub mod service;

pub use cache::{CacheStats, UuidCache};
pub use flusher::{CacheFlusher, spawn_flusher};
pub use service::CacheService;
