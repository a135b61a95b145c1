use std::path::{Path, PathBuf};
use std::time::Duration;

/// Identity cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache file location
    pub path: PathBuf,

    /// How often the background flusher writes a dirty cache
    pub flush_interval: Duration,

    /// Write a dirty cache one last time on shutdown
    pub flush_on_shutdown: bool,
}

impl CacheConfig {
    pub const DEFAULT_FILE_NAME: &'static str = "uuid-cache.json";
    pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a configuration for the cache file at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flush_interval: Self::DEFAULT_FLUSH_INTERVAL,
            flush_on_shutdown: true,
        }
    }

    /// Keep the cache file inside `dir` under the default file name
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(Self::DEFAULT_FILE_NAME))
    }

    /// Set the cache file location
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Set the periodic flush interval
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Enable or disable the final flush on shutdown
    pub fn flush_on_shutdown(mut self, enabled: bool) -> Self {
        self.flush_on_shutdown = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE_NAME)
    }
}
