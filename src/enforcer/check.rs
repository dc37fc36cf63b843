//! Permission check requests

use crate::model::{AuthorizationContext, Permissions, ResourceKey};

/// One "do these subjects hold these permissions here" question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    resource: ResourceKey,
    subjects: Vec<String>,
    permissions: Permissions,
    include_subresources: bool,
}

impl PermissionCheck {
    /// Check for the subjects of an authorization context
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::{AuthorizationContext, PermissionCheck, Permissions};
    ///
    /// let ctx = AuthorizationContext::new(["nginx:alice"]);
    /// let check = PermissionCheck::new(
    ///     "thing:/features".parse().unwrap(),
    ///     &ctx,
    ///     Permissions::new(["READ"]).unwrap(),
    /// )
    /// .including_subresources();
    /// assert!(check.includes_subresources());
    /// ```
    pub fn new(
        resource: ResourceKey,
        context: &AuthorizationContext,
        permissions: Permissions,
    ) -> Self {
        Self::for_subjects(resource, context.subject_ids(), permissions)
    }

    /// Check for an explicit list of subject ids
    pub fn for_subjects<I, S>(resource: ResourceKey, subjects: I, permissions: Permissions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PermissionCheck {
            resource,
            subjects: subjects.into_iter().map(Into::into).collect(),
            permissions,
            include_subresources: false,
        }
    }

    /// Also succeed if the permissions hold on any sub-resource
    pub fn including_subresources(mut self) -> Self {
        self.include_subresources = true;
        self
    }

    pub fn resource(&self) -> &ResourceKey {
        &self.resource
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn includes_subresources(&self) -> bool {
        self.include_subresources
    }
}
