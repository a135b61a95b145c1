//! Chain clearing between the identity and name maps.
//!
//! Clearing a token tombstones it and releases its name; releasing a name
//! clears the token that held it. The two steps feed each other through an
//! explicit worklist so the unwind never grows the call stack.

use super::IdentityIndex;
use crate::core::{IdentityRecord, fold_name};
use uuid::Uuid;

#[derive(Debug)]
pub(super) enum Link {
    /// token -> name -> token
    Token(Uuid),
    /// folded name -> token -> name
    Name(String),
}

impl IdentityIndex {
    pub(super) fn clear_chain(&mut self, start: Link) {
        let mut pending = vec![start];

        while let Some(link) = pending.pop() {
            match link {
                Link::Token(token) => {
                    // Keep the key so the token stays known.
                    let Some(record) = self.identities.get_mut(&token) else {
                        continue;
                    };
                    if let IdentityRecord::Live(name) =
                        std::mem::replace(record, IdentityRecord::Tombstoned)
                    {
                        pending.push(Link::Name(fold_name(&name)));
                        self.dirty = true;
                    }
                }
                Link::Name(folded) => {
                    if let Some(token) = self.names.remove(&folded) {
                        pending.push(Link::Token(token));
                        self.dirty = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_token_unwinds_name() {
        let mut index = IdentityIndex::new();
        let u = Uuid::from_u128(1);
        index.admit_live(u, "Steve".to_string());

        index.clear_chain(Link::Token(u));

        assert_eq!(index.record(&u), Some(&IdentityRecord::Tombstoned));
        assert!(!index.name_claimed("steve"));
        assert!(index.is_dirty());
    }

    #[test]
    fn test_clear_name_unwinds_token() {
        let mut index = IdentityIndex::new();
        let u = Uuid::from_u128(1);
        index.admit_live(u, "Steve".to_string());

        index.clear_chain(Link::Name("steve".to_string()));

        assert_eq!(index.record(&u), Some(&IdentityRecord::Tombstoned));
        assert!(index.is_dirty());
    }

    #[test]
    fn test_clear_missing_links_is_noop() {
        let mut index = IdentityIndex::new();
        index.admit_tombstone(Uuid::from_u128(1));

        index.clear_chain(Link::Token(Uuid::from_u128(1)));
        index.clear_chain(Link::Token(Uuid::from_u128(2)));
        index.clear_chain(Link::Name("nobody".to_string()));

        assert!(!index.is_dirty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_clear_token_with_culled_name() {
        // Live token whose name entry was culled at load: only the
        // identity side changes.
        let mut index = IdentityIndex::new();
        let (u1, u2) = (Uuid::from_u128(1), Uuid::from_u128(2));
        index.admit_live(u1, "Same".to_string());
        index.cull_name("same");
        index.admit_live(u2, "Other".to_string());

        index.clear_chain(Link::Token(u1));

        assert_eq!(index.record(&u1), Some(&IdentityRecord::Tombstoned));
        assert_eq!(index.name(&u2), Some("Other"));
    }
}
