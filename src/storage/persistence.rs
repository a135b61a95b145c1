//! File-backed store for the identity cache

use crate::core::{CacheError, RawEntry, Result};
use crate::storage::engine::CacheStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// On-disk layout: token string to name, `null` for tombstoned tokens.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
struct CacheFile(BTreeMap<String, Option<String>>);

/// JSON object of `"<uuid>": "Name"` pairs, with `null` for tombstoned tokens.
///
/// Writes go to a sibling `.tmp` file which is synced and renamed over the
/// target, so a crash mid-save leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<Vec<RawEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)
            .map_err(|e| CacheError::Io(format!("Failed to open {}: {}", self.path.display(), e)))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| CacheError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let CacheFile(map) = serde_json::from_slice(&data).map_err(|e| {
            CacheError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(map
            .into_iter()
            .map(|(token, name)| RawEntry { token, name })
            .collect())
    }

    fn save(&self, entries: &[RawEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CacheError::Io(format!("Failed to create cache directory: {}", e))
                })?;
            }
        }

        let file = CacheFile(
            entries
                .iter()
                .map(|entry| (entry.token.clone(), entry.name.clone()))
                .collect(),
        );
        let serialized = serde_json::to_vec_pretty(&file)
            .map_err(|e| CacheError::Serialization(format!("Failed to serialize cache: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| CacheError::Io(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(temp_file);
        writer
            .write_all(&serialized)
            .map_err(|e| CacheError::Io(format!("Failed to write cache: {}", e)))?;
        writer
            .flush()
            .map_err(|e| CacheError::Io(format!("Failed to flush cache: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| CacheError::Io(format!("Failed to sync cache: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| CacheError::Io(format!("Failed to rename cache file: {}", e)))?;
        Ok(())
    }
}
