//! Grant/revoke index of one trie node
//!
//! Pairs the granted and the revoked [`PermissionSubjectsMap`] of a node.
//! Decisions compare weights per permission: the grant must be strictly
//! closer than every competing revoke, so a revoke at the same weight as a
//! grant wins.

use super::subjects_map::{PermissionSubjectsMap, Weight};
use crate::model::EffectedSubjects;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantRevokeIndex {
    granted: PermissionSubjectsMap,
    revoked: PermissionSubjectsMap,
}

impl GrantRevokeIndex {
    pub fn new(granted: PermissionSubjectsMap, revoked: PermissionSubjectsMap) -> Self {
        GrantRevokeIndex { granted, revoked }
    }

    pub fn granted(&self) -> &PermissionSubjectsMap {
        &self.granted
    }

    pub fn revoked(&self) -> &PermissionSubjectsMap {
        &self.revoked
    }

    /// True if neither map relates any subject
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }

    /// Check whether `subjects` together hold all `permissions`
    ///
    /// For every permission, the highest grant weight among the subjects
    /// must exist and be strictly greater than the highest revoke weight
    /// among the same subjects (if any). An empty permission list is never
    /// satisfied.
    ///
    /// # Examples
    ///
    /// ```
    /// use policy_trie::trie::{GrantRevokeIndex, PermissionSubjectsMap};
    ///
    /// let mut granted = PermissionSubjectsMap::builder();
    /// granted.add_total_relation_of_weight_zero(&["READ"], &["alice"]);
    /// let mut revoked = PermissionSubjectsMap::builder();
    /// revoked.add_total_relation_of_weight_zero(&["READ"], &["alice"]);
    ///
    /// let index = GrantRevokeIndex::new(granted.build(), revoked.build());
    /// // revoke wins at equal weight
    /// assert!(!index.has_permissions(&["alice"], &["READ"]));
    /// ```
    pub fn has_permissions<S, P>(&self, subjects: &[S], permissions: &[P]) -> bool
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        if self
            .granted
            .max_weight_for_all_permissions(subjects, permissions)
            .is_none()
        {
            return false;
        }
        if self
            .revoked
            .max_nonempty_weight_for_all_permissions(subjects, permissions)
            .is_none()
        {
            return true;
        }
        permissions.iter().all(|permission| {
            let permission = permission.as_ref();
            match self.granted.max_weight_for_permission(subjects, permission) {
                Some(grant) => self
                    .revoked
                    .max_weight_for_permission(subjects, permission)
                    .map_or(true, |revoke| grant > revoke),
                None => false,
            }
        })
    }

    /// Check whether `subjects` hold at least one of `permissions`
    pub fn has_any_permission<S, P>(&self, subjects: &[S], permissions: &[P]) -> bool
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        permissions
            .iter()
            .any(|permission| self.has_permissions(subjects, std::slice::from_ref(permission)))
    }

    /// Highest grant weight of `subjects`, defined if all permissions are granted
    pub fn grant_weight<S, P>(&self, subjects: &[S], permissions: &[P]) -> Option<Weight>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        self.granted.max_weight_for_all_permissions(subjects, permissions)
    }

    /// Highest revoke weight of `subjects`, defined if any permission is revoked
    pub fn revoke_weight<S, P>(&self, subjects: &[S], permissions: &[P]) -> Option<Weight>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        self.revoked
            .max_nonempty_weight_for_all_permissions(subjects, permissions)
    }

    /// Every subject with any grant and every subject with any revoke
    ///
    /// Union over `permissions`, no weights compared.
    pub fn effected_subjects<P: AsRef<str>>(&self, permissions: &[P]) -> EffectedSubjects {
        EffectedSubjects::new(
            self.granted.subject_union(permissions).into_keys().collect(),
            self.revoked.subject_union(permissions).into_keys().collect(),
        )
    }

    /// Subjects after weights are compared
    ///
    /// `granted` holds the subjects that individually hold all
    /// `permissions`; `revoked` holds the subjects with a revoke on any of
    /// them that are not granted.
    pub fn resolved_subjects<P: AsRef<str>>(&self, permissions: &[P]) -> EffectedSubjects {
        let granted: BTreeSet<String> = self
            .granted
            .subject_intersect(permissions)
            .into_keys()
            .filter(|subject| self.has_permissions(std::slice::from_ref(subject), permissions))
            .collect();
        let revoked = self
            .revoked
            .subject_union(permissions)
            .into_keys()
            .filter(|subject| !granted.contains(subject))
            .collect();
        EffectedSubjects::new(granted, revoked)
    }

    /// Let `update` take precedence over this index
    ///
    /// Subjects granted by `update` lose their revokes here for the same
    /// permission, subjects revoked by `update` lose their grants, then the
    /// maps of `update` are merged in. Not symmetric:
    /// `a.override_by(&b)` generally differs from `b.override_by(&a)`.
    pub fn override_by(&self, update: &GrantRevokeIndex) -> GrantRevokeIndex {
        let mut granted = self.granted.to_builder();
        granted
            .remove_all_entries_from(&update.revoked)
            .add_all_entries_from(&update.granted);

        let mut revoked = self.revoked.to_builder();
        revoked
            .remove_all_entries_from(&update.granted)
            .add_all_entries_from(&update.revoked);

        GrantRevokeIndex {
            granted: granted.build(),
            revoked: revoked.build(),
        }
    }

    /// Same index one level further away
    pub fn copy_with_decremented_weight(&self) -> GrantRevokeIndex {
        GrantRevokeIndex {
            granted: self.granted.copy_with_decremented_weight(),
            revoked: self.revoked.copy_with_decremented_weight(),
        }
    }

    /// Same index one level closer
    pub fn copy_with_incremented_weight(&self) -> GrantRevokeIndex {
        GrantRevokeIndex {
            granted: self.granted.copy_with_incremented_weight(),
            revoked: self.revoked.copy_with_incremented_weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::SubjectWeights;

    fn map(entries: &[(&str, &[(&str, Weight)])]) -> PermissionSubjectsMap {
        let mut builder = PermissionSubjectsMap::builder();
        for (permission, subjects) in entries {
            let weights: SubjectWeights =
                subjects.iter().map(|(s, w)| (s.to_string(), *w)).collect();
            builder.put(*permission, weights);
        }
        builder.build()
    }

    #[test]
    fn test_subject_id_has_read_permission() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid_1", 0)])]),
            PermissionSubjectsMap::new(),
        );
        assert!(index.has_permissions(&["sid_1"], &["READ"]));
        assert!(!index.has_permissions(&["sid_2"], &["READ"]));
        assert!(!index.has_permissions(&["sid_1"], &["READ", "WRITE"]));
    }

    #[test]
    fn test_another_subject_id_has_no_read_permission_because_revoked_with_same_weight() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid_1", 0), ("sid_2", -1)])]),
            map(&[("READ", &[("sid_2", -1)])]),
        );
        assert!(index.has_permissions(&["sid_1"], &["READ"]));
        assert!(!index.has_permissions(&["sid_2"], &["READ"]));
    }

    #[test]
    fn test_closer_grant_wins_over_revoke() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)])]),
            map(&[("READ", &[("sid", -1)])]),
        );
        assert!(index.has_permissions(&["sid"], &["READ"]));
    }

    #[test]
    fn test_closer_revoke_wins_over_grant() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", -2)])]),
            map(&[("READ", &[("sid", -1)])]),
        );
        assert!(!index.has_permissions(&["sid"], &["READ"]));
    }

    #[test]
    fn test_revoke_of_other_subject_in_same_request() {
        // group grant is further away than the user revoke
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("group", -1)])]),
            map(&[("READ", &[("user", 0)])]),
        );
        assert!(index.has_permissions(&["group"], &["READ"]));
        assert!(!index.has_permissions(&["group", "user"], &["READ"]));
    }

    #[test]
    fn test_each_permission_compared_separately() {
        // READ granted close, WRITE granted far and revoked in between
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("a", 0)]), ("WRITE", &[("a", -2)])]),
            map(&[("WRITE", &[("b", -1)])]),
        );
        assert!(index.has_permissions(&["a", "b"], &["READ"]));
        assert!(!index.has_permissions(&["a", "b"], &["READ", "WRITE"]));
        assert!(index.has_any_permission(&["a", "b"], &["READ", "WRITE"]));
    }

    #[test]
    fn test_revoke_on_one_of_several_permissions_denies() {
        // only WRITE is revoked; READ has no revoke at all
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)]), ("WRITE", &[("sid", -1)])]),
            map(&[("WRITE", &[("sid", 0)])]),
        );
        assert_eq!(index.revoke_weight(&["sid"], &["READ", "WRITE"]), Some(0));
        assert!(index.has_permissions(&["sid"], &["READ"]));
        assert!(!index.has_permissions(&["sid"], &["READ", "WRITE"]));
    }

    #[test]
    fn test_empty_permissions_not_satisfied() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)])]),
            PermissionSubjectsMap::new(),
        );
        assert!(!index.has_permissions(&["sid"], &[] as &[&str]));
    }

    #[test]
    fn test_weights() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)]), ("WRITE", &[("sid", -3)])]),
            map(&[("WRITE", &[("sid", -1)])]),
        );
        assert_eq!(index.grant_weight(&["sid"], &["READ", "WRITE"]), Some(0));
        assert_eq!(index.revoke_weight(&["sid"], &["READ", "WRITE"]), Some(-1));
        assert_eq!(index.revoke_weight(&["sid"], &["READ"]), None);
    }

    #[test]
    fn test_effected_subjects_is_raw_union() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("a", 0), ("b", 0)]), ("WRITE", &[("c", 0)])]),
            map(&[("READ", &[("b", 0)]), ("EXECUTE", &[("d", 0)])]),
        );
        let effected = index.effected_subjects(&["READ", "WRITE"]);
        assert_eq!(effected.granted.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(effected.revoked.iter().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_resolved_subjects() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("a", 0), ("b", 0), ("c", 0)])]),
            map(&[("READ", &[("b", 0), ("c", -1)])]),
        );
        let resolved = index.resolved_subjects(&["READ"]);
        assert_eq!(resolved.granted.iter().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(resolved.revoked.iter().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_override_by_is_directional() {
        let grant = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)])]),
            PermissionSubjectsMap::new(),
        );
        let revoke = GrantRevokeIndex::new(
            PermissionSubjectsMap::new(),
            map(&[("READ", &[("sid", 0)])]),
        );

        let revoked_wins = grant.override_by(&revoke);
        assert_eq!(revoked_wins.granted().weight("READ", "sid"), None);
        assert_eq!(revoked_wins.revoked().weight("READ", "sid"), Some(0));
        assert!(!revoked_wins.has_permissions(&["sid"], &["READ"]));

        let granted_wins = revoke.override_by(&grant);
        assert_eq!(granted_wins.revoked().weight("READ", "sid"), None);
        assert_eq!(granted_wins.granted().weight("READ", "sid"), Some(0));
        assert!(granted_wins.has_permissions(&["sid"], &["READ"]));

        assert_ne!(revoked_wins, granted_wins);
    }

    #[test]
    fn test_override_by_only_strips_overlapping_pairs() {
        let base = GrantRevokeIndex::new(
            map(&[("READ", &[("a", -1), ("b", -1)]), ("WRITE", &[("a", -1)])]),
            map(&[("WRITE", &[("b", -1)])]),
        );
        let update = GrantRevokeIndex::new(
            map(&[("WRITE", &[("b", 0)])]),
            map(&[("READ", &[("a", 0)])]),
        );

        let merged = base.override_by(&update);
        assert_eq!(merged.granted().weight("READ", "a"), None);
        assert_eq!(merged.granted().weight("READ", "b"), Some(-1));
        assert_eq!(merged.granted().weight("WRITE", "a"), Some(-1));
        assert_eq!(merged.granted().weight("WRITE", "b"), Some(0));
        assert_eq!(merged.revoked().weight("WRITE", "b"), None);
        assert_eq!(merged.revoked().weight("READ", "a"), Some(0));
    }

    #[test]
    fn test_copy_with_decremented_weight() {
        let index = GrantRevokeIndex::new(
            map(&[("READ", &[("sid", 0)])]),
            map(&[("WRITE", &[("sid", -1)])]),
        );
        let down = index.copy_with_decremented_weight();
        assert_eq!(down.granted().weight("READ", "sid"), Some(-1));
        assert_eq!(down.revoked().weight("WRITE", "sid"), Some(-2));
        assert_eq!(down.copy_with_incremented_weight(), index);
        // decisions are invariant under a uniform shift
        assert!(down.has_permissions(&["sid"], &["READ"]));
    }
}
