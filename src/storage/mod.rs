pub mod engine;
pub mod gateway;
pub mod memory;
pub mod persistence;

pub use engine::CacheStore;
pub use gateway::{LoadReport, PersistenceGateway, admit_entries};
pub use memory::MemoryStore;
pub use persistence::FileStore;
