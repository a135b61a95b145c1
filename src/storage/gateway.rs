use crate::core::{RawEntry, Result, fold_name, parse_token};
use crate::index::IdentityIndex;
use crate::storage::engine::CacheStore;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// What happened to the entries read at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries admitted as live.
    pub admitted: usize,
    /// Entries admitted as tombstoned.
    pub tombstoned: usize,
    /// Entries dropped because the token did not parse.
    pub malformed: usize,
    /// Entries dropped because their token or name was already taken.
    pub duplicates: usize,
}

impl LoadReport {
    pub fn culled(&self) -> usize {
        self.malformed + self.duplicates
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live, {} tombstoned, {} malformed, {} duplicate",
            self.admitted, self.tombstoned, self.malformed, self.duplicates
        )
    }
}

/// Moves the index in and out of a [`CacheStore`].
pub struct PersistenceGateway {
    store: Box<dyn CacheStore>,
}

impl PersistenceGateway {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Read the store and build a clean index from the entries that survive
    /// filtering. Bad entries are culled with a warning, never fatal.
    pub fn load(&self) -> Result<(IdentityIndex, LoadReport)> {
        let entries = self.store.load()?;
        let loaded = admit_entries(entries);
        debug!("Loaded identity cache: {}", loaded.1);
        Ok(loaded)
    }

    /// Write every known token, tombstones included, replacing the store.
    pub fn save(&self, index: &IdentityIndex) -> Result<()> {
        let entries: Vec<RawEntry> = index
            .entries()
            .map(|(token, record)| RawEntry {
                token: token.to_string(),
                name: record.name().map(str::to_string),
            })
            .collect();
        self.store.save(&entries)
    }
}

/// Build an index from raw entries, culling what cannot be trusted.
///
/// A name seen twice drops the name-map entry of the first holder and
/// skips the second entry altogether. The first holder stays live without
/// a name-map entry until either player logs in again.
pub fn admit_entries(entries: Vec<RawEntry>) -> (IdentityIndex, LoadReport) {
    let mut index = IdentityIndex::new();
    let mut report = LoadReport::default();

    for RawEntry { token: raw_token, name } in entries {
        let token = match parse_token(&raw_token) {
            Ok(token) => token,
            Err(err) => {
                warn!("Culling invalid UUID: {}", err);
                report.malformed += 1;
                continue;
            }
        };

        if index.knows(&token) {
            warn!("Culling duplicate UUID \"{}\".", raw_token);
            report.duplicates += 1;
            continue;
        }

        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => {
                index.admit_tombstone(token);
                report.tombstoned += 1;
                continue;
            }
        };

        let folded = fold_name(&name);
        if index.name_claimed(&folded) {
            warn!("Culling duplicate player name \"{}\".", name);
            index.cull_name(&folded);
            report.duplicates += 1;
            continue;
        }

        index.admit_live(token, name);
        report.admitted += 1;
    }

    (index, report)
}
