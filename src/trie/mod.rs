//! Policy trie: weighted grant/revoke indices over resource paths
//!
//! - [`PermissionSubjectsMap`]: permission → (subject → weight), immutable,
//!   built through [`PermissionSubjectsMapBuilder`]
//! - [`GrantRevokeIndex`]: granted + revoked maps of one node; closer
//!   declarations win, revoke wins at equal weight
//! - [`PolicyTrie`]: arena of nodes keyed by resource-path segments, with
//!   transitive closure and JSON redaction

mod index;
mod json_view;
mod policy_trie;
mod subjects_map;

pub use index::GrantRevokeIndex;
pub use policy_trie::{Descendants, NodeId, NodeRef, PolicyTrie};
pub use subjects_map::{
    PermissionSubjectsMap, PermissionSubjectsMapBuilder, SubjectWeights, Weight,
};
