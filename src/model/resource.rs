//! Resource keys and JSON pointers
//!
//! A resource key is a resource type ("thing", "policy", "message") plus a
//! JSON-pointer-like path into that resource. The trie is keyed by the
//! sequence `[type, segment, segment, ...]`.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slash-delimited path into a JSON document
///
/// Empty segments are skipped, so `/`, `` and `//` all denote the root.
/// Segments use RFC 6901 escaping in their textual form: `~1` for `/` and
/// `~0` for `~`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The root pointer (no segments)
    pub fn root() -> Self {
        JsonPointer::default()
    }

    /// Parse a pointer from its textual form
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::model::JsonPointer;
    ///
    /// let pointer = JsonPointer::parse("/features/lamp/properties/on");
    /// assert_eq!(pointer.len(), 4);
    /// assert_eq!(JsonPointer::parse("/a~1b").segments(), &["a/b".to_string()]);
    /// ```
    pub fn parse(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect();
        JsonPointer { segments }
    }

    /// Build a pointer from already-decoded segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JsonPointer {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append one segment, returning a new pointer
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        let segment = segment.into();
        if !segment.is_empty() {
            segments.push(segment);
        }
        JsonPointer { segments }
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

/// Resource type plus path, e.g. `thing:/features/lamp`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    resource_type: String,
    path: JsonPointer,
}

impl ResourceKey {
    /// Create a resource key from a type and a textual path
    ///
    /// # Errors
    ///
    /// Returns `InvalidResourceKey` if the resource type is empty or
    /// contains `:` or `/`.
    pub fn new(resource_type: impl Into<String>, path: &str) -> Result<Self> {
        Self::with_pointer(resource_type, JsonPointer::parse(path))
    }

    pub fn with_pointer(resource_type: impl Into<String>, path: JsonPointer) -> Result<Self> {
        let resource_type = resource_type.into();
        if resource_type.is_empty() {
            return Err(PolicyError::InvalidResourceKey(
                "resource type cannot be empty".to_string(),
            ));
        }
        if resource_type.contains([':', '/']) {
            return Err(PolicyError::InvalidResourceKey(format!(
                "resource type '{}' cannot contain ':' or '/'",
                resource_type
            )));
        }
        Ok(ResourceKey {
            resource_type,
            path,
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn path(&self) -> &JsonPointer {
        &self.path
    }

    /// Trie keys for this resource: the type followed by each path segment
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::model::ResourceKey;
    ///
    /// let key: ResourceKey = "thing:/features/lamp".parse().unwrap();
    /// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["thing", "features", "lamp"]);
    /// ```
    pub fn segments(&self) -> impl Iterator<Item = &str> + Clone {
        std::iter::once(self.resource_type.as_str())
            .chain(self.path.segments().iter().map(String::as_str))
    }

    /// Key of the child resource one segment below this one
    pub fn child(&self, segment: impl Into<String>) -> Self {
        ResourceKey {
            resource_type: self.resource_type.clone(),
            path: self.path.append(segment),
        }
    }
}

impl FromStr for ResourceKey {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        let (resource_type, path) = s.split_once(':').ok_or_else(|| {
            PolicyError::InvalidResourceKey(format!("'{}' must be of the form type:/path", s))
        })?;
        ResourceKey::new(resource_type, path)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.path)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ResourceKey> for String {
    fn from(value: ResourceKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_normalization() {
        assert!(JsonPointer::parse("/").is_empty());
        assert!(JsonPointer::parse("").is_empty());
        assert_eq!(
            JsonPointer::parse("//features//lamp/"),
            JsonPointer::from_segments(["features", "lamp"])
        );
    }

    #[test]
    fn test_pointer_escaping() {
        let pointer = JsonPointer::parse("/a~1b/c~0d");
        assert_eq!(pointer.segments(), &["a/b".to_string(), "c~d".to_string()]);
        assert_eq!(pointer.to_string(), "/a~1b/c~0d");
        assert_eq!(JsonPointer::root().to_string(), "/");
    }

    #[test]
    fn test_parse_resource_key() {
        let key: ResourceKey = "thing:/attributes/location".parse().unwrap();
        assert_eq!(key.resource_type(), "thing");
        assert_eq!(key.path().len(), 2);
        assert_eq!(key.to_string(), "thing:/attributes/location");

        let root: ResourceKey = "thing:/".parse().unwrap();
        assert!(root.path().is_empty());
        assert_eq!(root.segments().collect::<Vec<_>>(), vec!["thing"]);
    }

    #[test]
    fn test_invalid_resource_keys() {
        assert!("/attributes".parse::<ResourceKey>().is_err()); // no type separator
        assert!(":/attributes".parse::<ResourceKey>().is_err()); // empty type
        assert!(ResourceKey::new("th/ing", "/").is_err());
    }

    #[test]
    fn test_child_key() {
        let key: ResourceKey = "thing:/features".parse().unwrap();
        assert_eq!(key.child("lamp").to_string(), "thing:/features/lamp");
    }

    #[test]
    fn test_serde_as_string() {
        let key: ResourceKey = serde_json::from_str("\"policy:/entries\"").unwrap();
        assert_eq!(key.resource_type(), "policy");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"policy:/entries\"");
    }
}
