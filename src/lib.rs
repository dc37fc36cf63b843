//! # Policy Trie - Trie-Based Policy Enforcement
//!
//! `policy-trie` answers "may these subjects do this here?" for hierarchical
//! resources such as JSON documents. Policies grant and revoke named
//! permissions to subjects on resource paths; the enforcer resolves them
//! with a weighted nearest-declaration-wins rule:
//!
//! - **Weighted resolution**: a declaration on a node has weight 0 and loses
//!   one per level of distance; the higher weight wins, revoke wins ties
//! - **Transitive closure**: every node carries its ancestors' declarations,
//!   so checks never walk up the trie
//! - **JSON redaction**: strip every field the subjects may not see
//! - **Enforcer cache**: built enforcers shared per policy id and revision
//!
//! ## Quick Start
//!
//! ```rust
//! use policy_trie::{
//!     AuthorizationContext, PermissionCheck, Permissions, Policy, Result,
//!     TrieBasedPolicyEnforcer,
//! };
//! use serde_json::json;
//!
//! # fn main() -> Result<()> {
//! let policy = Policy::from_json(r#"{
//!     "policyId": "org.example:lamp",
//!     "entries": {
//!         "owner": {
//!             "subjects": { "nginx:alice": { "type": "user" } },
//!             "resources": {
//!                 "thing:/": { "grant": ["READ", "WRITE"], "revoke": [] },
//!                 "thing:/attributes/secret": { "grant": [], "revoke": ["READ"] }
//!             }
//!         }
//!     }
//! }"#)?;
//!
//! let enforcer = TrieBasedPolicyEnforcer::new(&policy);
//! let alice = AuthorizationContext::new(["nginx:alice"]);
//! let read = Permissions::new(["READ"])?;
//!
//! let check = PermissionCheck::new("thing:/attributes/secret".parse()?, &alice, read.clone());
//! assert!(!enforcer.check(&check));
//!
//! let thing = json!({ "attributes": { "secret": 42, "color": "red" } });
//! let view = enforcer.build_json_view(&"thing:/".parse()?, &thing, &alice, &read);
//! assert_eq!(view, json!({ "attributes": { "color": "red" } }));
//! # Ok(())
//! # }
//! ```
//!
//! ## Caching Enforcers
//!
//! ```rust
//! use policy_trie::{EnforcerCache, EnforcerConfig, Policy, Result};
//!
//! # fn main() -> Result<()> {
//! let config = EnforcerConfig::from_toml_str("cache-capacity = 64")?;
//! let cache = EnforcerCache::new(&config)?;
//!
//! let policy = Policy::from_json(
//!     r#"{ "policyId": "org.example:p", "_revision": 3, "entries": {} }"#,
//! )?;
//! let enforcer = cache.get_or_build(&policy)?;
//! assert_eq!(enforcer.revision(), 3);
//! assert_eq!(cache.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod enforcer;
pub mod error;
pub mod model;
pub mod trie;
pub mod validation;

pub use config::EnforcerConfig;
pub use enforcer::{EnforcerCache, PermissionCheck, TrieBasedPolicyEnforcer};
pub use error::{PolicyError, Result};
pub use model::{
    AuthorizationContext, AuthorizationSubject, EffectedSubjects, JsonPointer, Permissions,
    Policy, PolicyEntry, ResourceKey, EXECUTE, READ, WRITE,
};
pub use trie::{GrantRevokeIndex, PermissionSubjectsMap, PolicyTrie};
pub use validation::{Label, PolicyId, SubjectId};
