use super::IdentityIndex;
use crate::core::{IdentityRecord, fold_name};
use std::fmt;
use uuid::Uuid;

/// A disagreement between the two maps of an [`IdentityIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// The name map points at a token that does not live-own that name.
    NameMismatch { name: String, token: Uuid },
    /// A live token has no name-map entry pointing back at it. Expected only
    /// after duplicate names were culled at load; the next login of either
    /// player repairs it.
    Unindexed { token: Uuid, name: String },
}

impl Inconsistency {
    /// Whether this is the dangling-name state left behind by load-time culling.
    pub fn is_transient(&self) -> bool {
        matches!(self, Inconsistency::Unindexed { .. })
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::NameMismatch { name, token } => {
                write!(f, "name '{}' points at {} which does not own it", name, token)
            }
            Inconsistency::Unindexed { token, name } => {
                write!(f, "{} owns '{}' but the name is not indexed", token, name)
            }
        }
    }
}

impl IdentityIndex {
    /// Cross-check both maps. An empty result means every live token and
    /// every indexed name agree with each other.
    pub fn verify(&self) -> Vec<Inconsistency> {
        let mut found = Vec::new();

        for (name, token) in &self.names {
            let agrees = match self.identities.get(token) {
                Some(IdentityRecord::Live(canonical)) => fold_name(canonical) == *name,
                _ => false,
            };
            if !agrees {
                found.push(Inconsistency::NameMismatch {
                    name: name.clone(),
                    token: *token,
                });
            }
        }

        for (token, record) in &self.identities {
            if let IdentityRecord::Live(name) = record {
                if self.names.get(&fold_name(name)) != Some(token) {
                    found.push(Inconsistency::Unindexed {
                        token: *token,
                        name: name.clone(),
                    });
                }
            }
        }

        found
    }
}
