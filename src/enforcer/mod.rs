//! Policy enforcement on top of the closed policy trie
//!
//! - [`TrieBasedPolicyEnforcer`]: permission checks, subject queries and
//!   JSON redaction for one policy revision
//! - [`PermissionCheck`]: a check request (resource, subjects, permissions)
//! - [`EnforcerCache`]: thread-safe LRU of built enforcers keyed by policy
//!   id and revision

mod cache;
mod check;
mod trie_based;

pub use cache::EnforcerCache;
pub use check::PermissionCheck;
pub use trie_based::TrieBasedPolicyEnforcer;
