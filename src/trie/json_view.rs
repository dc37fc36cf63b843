//! Redacting JSON documents with a closed policy trie
//!
//! The document is walked in lock-step with the trie. Each field is looked
//! up as a child of the current node; a field without a trie node inherits
//! the index of the nearest node above it. Objects are kept if anything in
//! them survives or the node itself grants; every other value (scalars,
//! arrays, `null`) is kept only if its node grants.
//!
//! Works on a transitively closed trie: indices are read node by node and
//! never combined with ancestors at query time.

use super::index::GrantRevokeIndex;
use super::policy_trie::{NodeRef, PolicyTrie};
use serde_json::{Map, Value};

/// Position in the trie while walking a document
#[derive(Clone, Copy)]
enum ViewCursor<'a> {
    Node(NodeRef<'a>),
    /// Below the deepest existing node; keeps that node's index
    Inherited(&'a GrantRevokeIndex),
}

impl<'a> ViewCursor<'a> {
    fn index(&self) -> &'a GrantRevokeIndex {
        match self {
            ViewCursor::Node(node) => node.index(),
            ViewCursor::Inherited(index) => index,
        }
    }

    fn child(&self, key: &str) -> ViewCursor<'a> {
        match self {
            ViewCursor::Node(node) => node
                .child(key)
                .map_or(ViewCursor::Inherited(node.index()), ViewCursor::Node),
            ViewCursor::Inherited(index) => ViewCursor::Inherited(index),
        }
    }

    fn view<S, P>(self, value: &Value, subjects: &[S], permissions: &[P]) -> Value
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        match value {
            Value::Null => Value::Null,
            Value::Object(fields) => {
                Value::Object(self.view_of_object(fields, subjects, permissions))
            }
            other if self.index().has_permissions(subjects, permissions) => other.clone(),
            _ => Value::Null,
        }
    }

    fn view_of_object<S, P>(
        self,
        fields: &Map<String, Value>,
        subjects: &[S],
        permissions: &[P],
    ) -> Map<String, Value>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let mut view = Map::new();
        for (key, value) in fields {
            let child = self.child(key);
            match value {
                Value::Object(nested) => {
                    let nested_view = child.view_of_object(nested, subjects, permissions);
                    if !nested_view.is_empty()
                        || child.index().has_permissions(subjects, permissions)
                    {
                        view.insert(key.clone(), Value::Object(nested_view));
                    }
                }
                _ => {
                    if child.index().has_permissions(subjects, permissions) {
                        view.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        view
    }
}

impl<'a> NodeRef<'a> {
    /// View of `value` rooted at this node
    ///
    /// `null` is returned unchanged. Objects are filtered field by field; any
    /// other top-level value is returned if this node grants and replaced by
    /// `null` otherwise.
    pub fn build_json_view<S, P>(&self, value: &Value, subjects: &[S], permissions: &[P]) -> Value
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        ViewCursor::Node(*self).view(value, subjects, permissions)
    }
}

impl PolicyTrie {
    /// View of `value` rooted at the root node
    pub fn build_json_view<S, P>(&self, value: &Value, subjects: &[S], permissions: &[P]) -> Value
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        self.root().build_json_view(value, subjects, permissions)
    }

    /// View of `value` rooted at the node of `keys`
    ///
    /// If the path does not exist in the trie the whole document inherits
    /// the index of the deepest existing node on it.
    pub fn build_json_view_at<I, K, S, P>(
        &self,
        keys: I,
        value: &Value,
        subjects: &[S],
        permissions: &[P],
    ) -> Value
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let (node, exact) = self.seek(keys);
        let cursor = if exact {
            ViewCursor::Node(node)
        } else {
            ViewCursor::Inherited(node.index())
        };
        cursor.view(value, subjects, permissions)
    }
}
