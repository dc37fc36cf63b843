//! Policy model consumed by the enforcement core
//!
//! - [`Policy`] / [`PolicyEntry`]: labelled entries of subjects and
//!   per-resource granted/revoked permissions, in declaration order
//! - [`ResourceKey`] / [`JsonPointer`]: resource type plus path
//! - [`Permissions`]: opaque permission names
//! - [`AuthorizationContext`]: the subjects a request is authorized as
//! - [`EffectedSubjects`]: granted/revoked subject sets returned by queries

mod context;
mod effected;
mod permissions;
mod policy;
mod resource;

pub use context::{AuthorizationContext, AuthorizationSubject};
pub use effected::EffectedSubjects;
pub use permissions::{Permissions, EXECUTE, READ, WRITE};
pub use policy::{EffectedPermissions, Policy, PolicyEntry, Resource, Subject};
pub use resource::{JsonPointer, ResourceKey};
