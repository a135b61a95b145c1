//! Bidirectional token <-> name index
//!
//! The identity map is primary and holds the canonical (display-case) name.
//! The name map is secondary: keys are folded to lowercase and kept sorted so
//! partial names can be completed with a bounded successor scan.

mod chain;
mod verify;

pub use verify::Inconsistency;

use crate::core::{IdentityRecord, fold_name};
use chain::Link;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct IdentityIndex {
    /// Primary mapping from token to record. Keys are never removed.
    identities: HashMap<Uuid, IdentityRecord>,
    /// Secondary mapping from folded name to token. Some live tokens may be
    /// missing here when duplicate names were culled at load.
    names: BTreeMap<String, Uuid>,
    /// Set when either map changed since the last successful save.
    dirty: bool,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Live canonical name of `token`, or `None` if unseen or tombstoned.
    pub fn name(&self, token: &Uuid) -> Option<&str> {
        self.identities.get(token).and_then(IdentityRecord::name)
    }

    /// Raw record for `token`. Distinguishes unseen (`None`) from tombstoned.
    pub fn record(&self, token: &Uuid) -> Option<&IdentityRecord> {
        self.identities.get(token)
    }

    /// Case-insensitive exact lookup. Partial names are NOT accepted.
    pub fn uuid_exact(&self, name: &str) -> Option<Uuid> {
        self.names.get(&fold_name(name)).copied()
    }

    /// Case-insensitive lookup that also accepts a unique prefix.
    ///
    /// With `annika` and `anton` indexed, `"ann"` resolves to annika while
    /// `"an"` is ambiguous and resolves to nothing.
    pub fn uuid(&self, name: &str) -> Option<Uuid> {
        let folded = fold_name(name);

        if let Some(uuid) = self.names.get(&folded) {
            return Some(*uuid);
        }

        // Every key with `folded` as a prefix sorts right after it, so the
        // first two successors decide whether the completion is unique.
        let mut successors = self
            .names
            .range::<str, _>((Bound::Excluded(folded.as_str()), Bound::Unbounded));

        let (first_key, first_uuid) = successors.next()?;
        if !first_key.starts_with(folded.as_str()) {
            return None;
        }

        match successors.next() {
            Some((second_key, _)) if second_key.starts_with(folded.as_str()) => None,
            _ => Some(*first_uuid),
        }
    }

    /// Number of known tokens, live or tombstoned.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.identities.values().filter(|r| r.is_live()).count()
    }

    pub fn tombstoned_count(&self) -> usize {
        self.len() - self.live_count()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Every known token and its record, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&Uuid, &IdentityRecord)> {
        self.identities.iter()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Merge a login into the index. Returns `true` if anything changed.
    ///
    /// The token is authoritative: its new name wins over whatever it owned
    /// before, and the name is released from any other token first. Two
    /// players may even have swapped names between logins.
    ///
    /// A blank name is treated as [`untrack`](Self::untrack).
    pub fn reconcile(&mut self, token: Uuid, name: &str) -> bool {
        if name.is_empty() {
            return self.untrack(token);
        }

        let folded = fold_name(name);

        // Unchanged logins must not dirty the cache.
        let owns_name = self.name(&token) == Some(name);
        let indexed = self.names.get(&folded) == Some(&token);
        if owns_name && indexed {
            return false;
        }

        self.clear_chain(Link::Token(token));
        self.clear_chain(Link::Name(folded.clone()));

        self.identities
            .insert(token, IdentityRecord::Live(name.to_string()));
        self.names.insert(folded, token);
        self.dirty = true;
        true
    }

    /// Release whatever name `token` owns. The token stays known, tombstoned.
    /// Returns `true` if the token was live.
    pub fn untrack(&mut self, token: Uuid) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        self.clear_chain(Link::Token(token));
        let changed = self.dirty;
        self.dirty |= was_dirty;
        changed
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // ========================================================================
    // Load-time admission (used by the persistence gateway)
    // ========================================================================

    pub(crate) fn knows(&self, token: &Uuid) -> bool {
        self.identities.contains_key(token)
    }

    pub(crate) fn name_claimed(&self, folded: &str) -> bool {
        self.names.contains_key(folded)
    }

    /// Drop the name-record entry for `folded` without touching the identity
    /// record of the token that held it.
    pub(crate) fn cull_name(&mut self, folded: &str) -> Option<Uuid> {
        self.names.remove(folded)
    }

    pub(crate) fn admit_live(&mut self, token: Uuid, name: String) {
        self.names.insert(fold_name(&name), token);
        self.identities.insert(token, IdentityRecord::Live(name));
    }

    pub(crate) fn admit_tombstone(&mut self, token: Uuid) {
        self.identities.insert(token, IdentityRecord::Tombstoned);
    }
}
