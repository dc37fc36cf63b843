//! Validated identifiers used by policy documents
//!
//! Policy ids, entry labels and subject ids arrive as untrusted strings. The
//! newtypes in this module are the only way to obtain them, so everything
//! past the model layer can treat them as well-formed.

use crate::error::{PolicyError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Namespaced policy identifier (`namespace:name`)
///
/// # Rules
/// - Namespace is empty or a dotted sequence of identifiers
///   (`org.example`, `com.acme.devices`)
/// - A single `:` separates namespace and name
/// - Name is non-empty and contains no control characters or `/`
///
/// # Examples
///
/// ```
/// use policy_trie::validation::PolicyId;
///
/// let id = PolicyId::new("org.example:lamp-policy").unwrap();
/// assert_eq!(id.namespace(), "org.example");
/// assert_eq!(id.name(), "lamp-policy");
///
/// assert!(PolicyId::new("no-namespace-separator").is_err());
/// assert!(PolicyId::new("org.example:with/slash").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyId(String);

impl PolicyId {
    /// Pattern for `namespace:name`
    const PATTERN: &'static str =
        r"^(?:[a-zA-Z]\w*(?:\.[a-zA-Z]\w*)*)?:[^\x00-\x1F\x7F/]+$";

    /// Create a new validated policy id
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicyId` if the id doesn't match `namespace:name`.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !Self::regex().is_match(&id) {
            return Err(PolicyError::InvalidPolicyId(format!(
                "'{}' must be of the form namespace:name",
                id
            )));
        }
        Ok(PolicyId(id))
    }

    fn regex() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| Regex::new(Self::PATTERN).expect("policy id pattern is valid"))
    }

    /// Namespace part (may be empty)
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or_default()
    }

    /// Name part
    pub fn name(&self) -> &str {
        self.0.split_once(':').map(|(_, name)| name).unwrap_or_default()
    }
}

/// Label of a policy entry
///
/// Labels identify entries within one policy; a later entry with the same
/// label replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(PolicyError::InvalidLabel("label cannot be empty".to_string()));
        }
        if label.trim() != label {
            return Err(PolicyError::InvalidLabel(format!(
                "label '{}' has surrounding whitespace",
                label
            )));
        }
        Ok(Label(label))
    }
}

/// Subject identifier, conventionally `issuer:id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(PolicyError::InvalidSubjectId(
                "subject id cannot be empty".to_string(),
            ));
        }
        Ok(SubjectId(id))
    }
}

macro_rules! validated_string {
    ($name:ident) => {
        impl $name {
            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to String
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = PolicyError;

            fn try_from(value: String) -> Result<Self> {
                $name::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

validated_string!(PolicyId);
validated_string!(Label);
validated_string!(SubjectId);
