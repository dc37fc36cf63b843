//! Policy enforcer backed by a transitively closed policy trie
//!
//! The enforcer is built once per policy revision and is read-only
//! afterwards. Every query reads node indices and allocates its own result,
//! so a shared enforcer answers concurrent queries without locking.

use super::PermissionCheck;
use crate::model::{AuthorizationContext, EffectedSubjects, Permissions, Policy, ResourceKey};
use crate::trie::{NodeRef, PolicyTrie};
use crate::validation::PolicyId;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TrieBasedPolicyEnforcer {
    policy_id: Option<PolicyId>,
    revision: i64,
    trie: PolicyTrie,
}

impl TrieBasedPolicyEnforcer {
    /// Build the enforcer of a policy
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::{
    ///     AuthorizationContext, PermissionCheck, Permissions, Policy, TrieBasedPolicyEnforcer,
    /// };
    ///
    /// let policy = Policy::from_json(r#"{
    ///     "entries": {
    ///         "owner": {
    ///             "subjects": { "nginx:alice": { "type": "user" } },
    ///             "resources": { "thing:/": { "grant": ["READ"], "revoke": [] } }
    ///         }
    ///     }
    /// }"#).unwrap();
    ///
    /// let enforcer = TrieBasedPolicyEnforcer::new(&policy);
    /// let ctx = AuthorizationContext::new(["nginx:alice"]);
    /// let read = Permissions::new(["READ"]).unwrap();
    ///
    /// let check = PermissionCheck::new("thing:/attributes".parse().unwrap(), &ctx, read);
    /// assert!(enforcer.has_permissions_on_resource(&check));
    /// ```
    pub fn new(policy: &Policy) -> Self {
        let trie = PolicyTrie::from_policy(policy).transitive_closure();
        info!(
            "Built enforcer for policy {} revision {} ({} nodes)",
            policy.id().map_or("<anonymous>", PolicyId::as_str),
            policy.revision(),
            trie.node_count()
        );
        TrieBasedPolicyEnforcer {
            policy_id: policy.id().cloned(),
            revision: policy.revision(),
            trie,
        }
    }

    pub fn policy_id(&self) -> Option<&PolicyId> {
        self.policy_id.as_ref()
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// The transitively closed trie
    pub fn trie(&self) -> &PolicyTrie {
        &self.trie
    }

    /// Answer a check, honouring its sub-resource flag
    pub fn check(&self, check: &PermissionCheck) -> bool {
        let allowed = if check.includes_subresources() {
            self.has_permissions_on_resource_or_any_subresource(check)
        } else {
            self.has_permissions_on_resource(check)
        };
        debug!(
            "Check {:?} on {} for {} subjects (subresources: {}): {}",
            check.permissions().as_slice(),
            check.resource(),
            check.subjects().len(),
            check.includes_subresources(),
            allowed
        );
        allowed
    }

    /// Permissions hold on the resource itself
    ///
    /// A resource without its own trie node is judged by the deepest
    /// existing ancestor, whose closed index already carries everything
    /// inherited.
    pub fn has_permissions_on_resource(&self, check: &PermissionCheck) -> bool {
        self.trie
            .seek_to_least_ancestor(check.resource().segments())
            .index()
            .has_permissions(check.subjects(), check.permissions().as_slice())
    }

    /// Permissions hold on the resource or on at least one sub-resource
    pub fn has_permissions_on_resource_or_any_subresource(&self, check: &PermissionCheck) -> bool {
        let subjects = check.subjects();
        let permissions = check.permissions().as_slice();
        self.subtree(check.resource())
            .any(|node| node.index().has_permissions(subjects, permissions))
    }

    /// Resolved granted and revoked subjects on the resource
    pub fn subjects_with_permission(
        &self,
        resource: &ResourceKey,
        permissions: &Permissions,
    ) -> EffectedSubjects {
        self.trie
            .seek_to_least_ancestor(resource.segments())
            .index()
            .resolved_subjects(permissions.as_slice())
    }

    /// Subjects holding the permissions on the resource or any sub-resource
    pub fn subjects_with_partial_permission(
        &self,
        resource: &ResourceKey,
        permissions: &Permissions,
    ) -> BTreeSet<String> {
        let permissions = permissions.as_slice();
        let mut subjects = BTreeSet::new();
        for node in self.subtree(resource) {
            for subject in node.index().granted().subject_intersect(permissions).into_keys() {
                if !subjects.contains(&subject)
                    && node
                        .index()
                        .has_permissions(std::slice::from_ref(&subject), permissions)
                {
                    subjects.insert(subject);
                }
            }
        }
        subjects
    }

    /// Subjects holding the permissions on the resource and every sub-resource
    ///
    /// A subject granted on the resource but revoked anywhere below it is
    /// excluded.
    pub fn subjects_with_unrestricted_permission(
        &self,
        resource: &ResourceKey,
        permissions: &Permissions,
    ) -> BTreeSet<String> {
        let permissions = permissions.as_slice();
        let mut nodes = self.subtree(resource);
        let Some(start) = nodes.next() else {
            return BTreeSet::new();
        };

        let mut subjects: BTreeSet<String> = start
            .index()
            .resolved_subjects(permissions)
            .granted;
        for node in nodes {
            if subjects.is_empty() {
                break;
            }
            subjects.retain(|subject| {
                node.index()
                    .has_permissions(std::slice::from_ref(subject), permissions)
            });
        }
        subjects
    }

    /// Redact `value`, the content of `resource`, to what the context may see
    pub fn build_json_view(
        &self,
        resource: &ResourceKey,
        value: &Value,
        context: &AuthorizationContext,
        permissions: &Permissions,
    ) -> Value {
        self.trie.build_json_view_at(
            resource.segments(),
            value,
            &context.subject_ids(),
            permissions.as_slice(),
        )
    }

    /// The resource's node followed by its descendants
    ///
    /// A resource without a node of its own has no sub-resources in the
    /// trie; only its least ancestor is yielded.
    fn subtree(&self, resource: &ResourceKey) -> impl Iterator<Item = NodeRef<'_>> {
        let (node, exact) = self.trie.seek(resource.segments());
        std::iter::once(node).chain(exact.then(|| node.descendants()).into_iter().flatten())
    }
}
