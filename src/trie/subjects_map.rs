//! Permission → (subject → weight) relation
//!
//! A `PermissionSubjectsMap` records, per permission, which subjects it
//! relates to and at which weight. Weights are distances: a declaration made
//! directly on a trie node has weight 0, the same declaration seen one level
//! further down has weight -1, and so on. Larger weights are closer and win.
//!
//! Built maps are immutable. Mutation goes through
//! [`PermissionSubjectsMapBuilder`]; set-algebra and weight shifts on a built
//! map return new maps.

use ahash::RandomState;
use std::collections::{BTreeSet, HashMap};

/// Distance of a declaration from the node it is evaluated at
pub type Weight = i32;

/// Subjects related to one permission, with their weights
pub type SubjectWeights = HashMap<String, Weight, RandomState>;

type PermissionTable = HashMap<String, SubjectWeights, RandomState>;

/// Immutable permission → (subject → weight) map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSubjectsMap {
    table: PermissionTable,
}

/// Mutable builder for [`PermissionSubjectsMap`]
#[derive(Debug, Clone, Default)]
pub struct PermissionSubjectsMapBuilder {
    table: PermissionTable,
}

impl PermissionSubjectsMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the subjects of a permission, returning the previous ones
    pub fn put(
        &mut self,
        permission: impl Into<String>,
        subjects: SubjectWeights,
    ) -> Option<SubjectWeights> {
        self.table.insert(permission.into(), subjects)
    }

    /// Relate every subject to every permission at weight 0
    pub fn add_total_relation_of_weight_zero<P, S>(
        &mut self,
        permissions: &[P],
        subjects: &[S],
    ) -> &mut Self
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        for permission in permissions {
            let related = self
                .table
                .entry(permission.as_ref().to_string())
                .or_default();
            for subject in subjects {
                related.insert(subject.as_ref().to_string(), 0);
            }
        }
        self
    }

    /// Per-permission union; weights from `other` overwrite existing ones
    pub fn add_all_entries_from(&mut self, other: &PermissionSubjectsMap) -> &mut Self {
        for (permission, subjects) in &other.table {
            let related = self.table.entry(permission.clone()).or_default();
            for (subject, weight) in subjects {
                related.insert(subject.clone(), *weight);
            }
        }
        self
    }

    /// Per-permission removal of every subject `other` relates
    ///
    /// Permissions whose subjects all get removed stay present with an
    /// empty subject map.
    pub fn remove_all_entries_from(&mut self, other: &PermissionSubjectsMap) -> &mut Self {
        for (permission, subjects) in &other.table {
            if let Some(related) = self.table.get_mut(permission) {
                for subject in subjects.keys() {
                    related.remove(subject);
                }
            }
        }
        self
    }

    pub fn build(self) -> PermissionSubjectsMap {
        PermissionSubjectsMap { table: self.table }
    }
}

impl PermissionSubjectsMap {
    /// The empty map
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PermissionSubjectsMapBuilder {
        PermissionSubjectsMapBuilder::new()
    }

    /// Builder seeded with a copy of this map
    pub fn to_builder(&self) -> PermissionSubjectsMapBuilder {
        PermissionSubjectsMapBuilder {
            table: self.table.clone(),
        }
    }

    pub fn get(&self, permission: &str) -> Option<&SubjectWeights> {
        self.table.get(permission)
    }

    pub fn weight(&self, permission: &str, subject: &str) -> Option<Weight> {
        self.table.get(permission)?.get(subject).copied()
    }

    pub fn contains_permission(&self, permission: &str) -> bool {
        self.table.contains_key(permission)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Number of permissions with an entry (empty subject maps included)
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if no (permission, subject) pair is related
    pub fn is_empty(&self) -> bool {
        self.table.values().all(HashMap::is_empty)
    }

    /// Every subject related to any permission
    pub fn all_subjects(&self) -> BTreeSet<String> {
        self.table
            .values()
            .flat_map(|subjects| subjects.keys().cloned())
            .collect()
    }

    /// Highest weight among `subjects` for one permission
    pub fn max_weight_for_permission<S: AsRef<str>>(
        &self,
        subjects: &[S],
        permission: &str,
    ) -> Option<Weight> {
        let related = self.table.get(permission)?;
        subjects
            .iter()
            .filter_map(|subject| related.get(subject.as_ref()).copied())
            .max()
    }

    /// Highest weight among `subjects` across all `permissions`
    ///
    /// Defined only if every requested permission relates to at least one
    /// of the subjects; `None` otherwise and for an empty permission list.
    pub fn max_weight_for_all_permissions<S, P>(
        &self,
        subjects: &[S],
        permissions: &[P],
    ) -> Option<Weight>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let mut max: Option<Weight> = None;
        for permission in permissions {
            let weight = self.max_weight_for_permission(subjects, permission.as_ref())?;
            max = Some(max.map_or(weight, |m| m.max(weight)));
        }
        max
    }

    /// Highest weight among `subjects` over the permissions they relate to
    ///
    /// Permissions none of the subjects relate to are skipped; `None` only
    /// if no requested permission relates to any of the subjects.
    ///
    /// Used on the revoke side, where a single related revoke can defeat a
    /// grant, so no revoked permission may be missed here. Callers still
    /// decide each permission on its own, so the looser bound never grants.
    pub fn max_nonempty_weight_for_all_permissions<S, P>(
        &self,
        subjects: &[S],
        permissions: &[P],
    ) -> Option<Weight>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        permissions
            .iter()
            .filter_map(|permission| {
                self.max_weight_for_permission(subjects, permission.as_ref())
            })
            .max()
    }

    /// Subjects related to any of `permissions`, first-seen weight kept
    pub fn subject_union<P: AsRef<str>>(&self, permissions: &[P]) -> SubjectWeights {
        let mut union = SubjectWeights::default();
        for permission in permissions {
            if let Some(related) = self.table.get(permission.as_ref()) {
                for (subject, weight) in related {
                    union.entry(subject.clone()).or_insert(*weight);
                }
            }
        }
        union
    }

    /// Subjects related to all of `permissions`, weight of the first permission kept
    ///
    /// The intersection over no permissions is empty.
    pub fn subject_intersect<P: AsRef<str>>(&self, permissions: &[P]) -> SubjectWeights {
        let Some((first, rest)) = permissions.split_first() else {
            return SubjectWeights::default();
        };
        let mut intersect = self
            .table
            .get(first.as_ref())
            .cloned()
            .unwrap_or_default();
        for permission in rest {
            match self.table.get(permission.as_ref()) {
                Some(related) => intersect.retain(|subject, _| related.contains_key(subject)),
                None => return SubjectWeights::default(),
            }
        }
        intersect
    }

    /// New map with the entries of both; weights from `other` win on overlap
    pub fn union(&self, other: &PermissionSubjectsMap) -> PermissionSubjectsMap {
        let mut builder = self.to_builder();
        builder.add_all_entries_from(other);
        builder.build()
    }

    /// New map without the (permission, subject) pairs `other` relates
    pub fn without(&self, other: &PermissionSubjectsMap) -> PermissionSubjectsMap {
        let mut builder = self.to_builder();
        builder.remove_all_entries_from(other);
        builder.build()
    }

    pub fn copy_with_incremented_weight(&self) -> PermissionSubjectsMap {
        self.copy_with_weight_shift(1)
    }

    pub fn copy_with_decremented_weight(&self) -> PermissionSubjectsMap {
        self.copy_with_weight_shift(-1)
    }

    fn copy_with_weight_shift(&self, delta: Weight) -> PermissionSubjectsMap {
        let table = self
            .table
            .iter()
            .map(|(permission, subjects)| {
                let shifted = subjects
                    .iter()
                    .map(|(subject, weight)| (subject.clone(), weight.saturating_add(delta)))
                    .collect();
                (permission.clone(), shifted)
            })
            .collect();
        PermissionSubjectsMap { table }
    }
}
