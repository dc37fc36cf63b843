//! Permission names
//!
//! Permissions are opaque strings with no hierarchy among themselves; the
//! hierarchy lives in resource paths. A `Permissions` value is kept sorted
//! and de-duplicated so it can be handed to the trie as a slice.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};

/// Read access
pub const READ: &str = "READ";
/// Write access
pub const WRITE: &str = "WRITE";
/// Execute access (messages, live commands)
pub const EXECUTE: &str = "EXECUTE";

/// Sorted, de-duplicated set of permission names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Permissions(Vec<String>);

impl Permissions {
    /// Create a permission set
    ///
    /// # Errors
    ///
    /// Returns `InvalidPermission` for empty names or names containing whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::model::{Permissions, READ, WRITE};
    ///
    /// let permissions = Permissions::new([WRITE, READ, READ]).unwrap();
    /// assert_eq!(permissions.as_slice(), &["READ".to_string(), "WRITE".to_string()]);
    /// ```
    pub fn new<I, S>(permissions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        for permission in permissions {
            let permission = permission.into();
            if permission.is_empty() || permission.chars().any(char::is_whitespace) {
                return Err(PolicyError::InvalidPermission(format!(
                    "'{}' must be a non-empty name without whitespace",
                    permission
                )));
            }
            names.push(permission);
        }
        names.sort();
        names.dedup();
        Ok(Permissions(names))
    }

    /// Empty permission set
    pub fn none() -> Self {
        Permissions(Vec::new())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.binary_search_by(|p| p.as_str().cmp(permission)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for Permissions {
    type Error = PolicyError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Permissions::new(value)
    }
}

impl From<Permissions> for Vec<String> {
    fn from(value: Permissions) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_deduplicated() {
        let permissions = Permissions::new(["WRITE", "READ", "WRITE"]).unwrap();
        assert_eq!(permissions.len(), 2);
        assert_eq!(permissions.iter().collect::<Vec<_>>(), vec!["READ", "WRITE"]);
        assert!(permissions.contains(READ));
        assert!(!permissions.contains(EXECUTE));
    }

    #[test]
    fn test_invalid_names() {
        assert!(Permissions::new([""]).is_err());
        assert!(Permissions::new(["READ ALL"]).is_err());
    }

    #[test]
    fn test_empty_set() {
        assert!(Permissions::none().is_empty());
        assert_eq!(Permissions::new(Vec::<String>::new()).unwrap(), Permissions::none());
    }

    #[test]
    fn test_json_form() {
        let permissions: Permissions = serde_json::from_str(r#"["WRITE","READ"]"#).unwrap();
        assert_eq!(serde_json::to_string(&permissions).unwrap(), r#"["READ","WRITE"]"#);
        assert!(serde_json::from_str::<Permissions>(r#"[""]"#).is_err());
    }
}
