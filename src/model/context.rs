//! Authorization context of a request
//!
//! The context carries every subject the caller was authenticated as
//! (user id, group ids, client id...). Permission checks succeed if the
//! combined grants of those subjects win over their combined revokes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One authenticated subject of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationSubject(String);

impl AuthorizationSubject {
    pub fn new(id: impl Into<String>) -> Self {
        AuthorizationSubject(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered set of subjects a request is authorized as
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    subjects: Vec<AuthorizationSubject>,
}

impl AuthorizationContext {
    /// Create a context; duplicate subjects are dropped, first occurrence wins
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<AuthorizationSubject> = Vec::new();
        for subject in subjects {
            let subject = AuthorizationSubject::new(subject);
            if !unique.contains(&subject) {
                unique.push(subject);
            }
        }
        AuthorizationContext { subjects: unique }
    }

    pub fn subjects(&self) -> &[AuthorizationSubject] {
        &self.subjects
    }

    /// Primary subject (the first one authenticated)
    pub fn first_subject(&self) -> Option<&AuthorizationSubject> {
        self.subjects.first()
    }

    /// Subject ids in context order, ready for trie queries
    pub fn subject_ids(&self) -> Vec<&str> {
        self.subjects.iter().map(AuthorizationSubject::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
