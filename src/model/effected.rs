//! Granted/revoked subject sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subjects a permission query touches, split by effect
///
/// Depending on where it comes from this is either the raw view (every
/// subject with any grant / any revoke) or the resolved view after weights
/// have been compared; see the producing method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectedSubjects {
    pub granted: BTreeSet<String>,
    pub revoked: BTreeSet<String>,
}

impl EffectedSubjects {
    pub fn new(granted: BTreeSet<String>, revoked: BTreeSet<String>) -> Self {
        EffectedSubjects { granted, revoked }
    }

    pub fn is_granted(&self, subject: &str) -> bool {
        self.granted.contains(subject)
    }

    pub fn is_revoked(&self, subject: &str) -> bool {
        self.revoked.contains(subject)
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}
