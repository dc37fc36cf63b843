//! Property-based tests for weight resolution and redaction
//!
//! Uses proptest to check the trie invariants over random policies

use policy_trie::trie::{PermissionSubjectsMap, SubjectWeights};
use policy_trie::{
    GrantRevokeIndex, Label, Permissions, Policy, PolicyEntry, PolicyTrie, ResourceKey, SubjectId,
};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const PERMISSIONS: [&str; 3] = ["READ", "WRITE", "EXECUTE"];
const SUBJECTS: [&str; 4] = ["sid_0", "sid_1", "sid_2", "sid_3"];
const SEGMENTS: [&str; 3] = ["a", "b", "c"];

fn subjects_map() -> impl Strategy<Value = PermissionSubjectsMap> {
    prop::collection::vec((0usize..3, 0usize..4, -5i32..=0), 0..12).prop_map(|triples| {
        let mut table: BTreeMap<&str, SubjectWeights> = BTreeMap::new();
        for (permission, subject, weight) in triples {
            table
                .entry(PERMISSIONS[permission])
                .or_default()
                .insert(SUBJECTS[subject].to_string(), weight);
        }
        let mut builder = PermissionSubjectsMap::builder();
        for (permission, subjects) in table {
            builder.put(permission, subjects);
        }
        builder.build()
    })
}

/// Map relating one subject to one permission
fn single(permission: &str, subject: &str, weight: i32) -> PermissionSubjectsMap {
    let mut subjects = SubjectWeights::default();
    subjects.insert(subject.to_string(), weight);
    let mut builder = PermissionSubjectsMap::builder();
    builder.put(permission, subjects);
    builder.build()
}

fn path() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(SEGMENTS.to_vec()), 0..4)
}

/// Random single-subject declarations: (path, granted?, permission)
fn declarations() -> impl Strategy<Value = Vec<(Vec<&'static str>, bool, usize)>> {
    prop::collection::vec((path(), any::<bool>(), 0usize..3), 1..10)
}

fn policy(declarations: &[(Vec<&'static str>, bool, usize)]) -> Policy {
    let mut policy = Policy::new();
    for (i, (segments, granted, permission)) in declarations.iter().enumerate() {
        let key = ResourceKey::new("thing", &format!("/{}", segments.join("/"))).unwrap();
        let permission = Permissions::new([PERMISSIONS[*permission]]).unwrap();
        let (grant, revoke) = if *granted {
            (permission, Permissions::none())
        } else {
            (Permissions::none(), permission)
        };
        policy.add_entry(
            PolicyEntry::new(Label::new(format!("e{}", i)).unwrap())
                .with_subject(SubjectId::new("sid").unwrap(), "test")
                .with_resource(key, grant, revoke),
        );
    }
    policy
}

fn json_document() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop::collection::vec((prop::sample::select(SEGMENTS.to_vec()), inner), 0..3).prop_map(
            |fields| {
                let mut object = Map::new();
                for (key, value) in fields {
                    object.insert(key.to_string(), value);
                }
                Value::Object(object)
            },
        )
    })
}

/// Every field of `view` also exists in `original` with an equal leaf
fn is_subview(view: &Value, original: &Value) -> bool {
    match (view, original) {
        (Value::Object(view), Value::Object(original)) => view.iter().all(|(key, value)| {
            original
                .get(key)
                .map_or(false, |original| is_subview(value, original))
        }),
        (view, original) => view.is_null() || view == original,
    }
}

proptest! {
    #[test]
    fn prop_intersect_is_subset_of_union(map in subjects_map(), mask in 1usize..8) {
        let permissions: Vec<&str> = (0..3)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| PERMISSIONS[i])
            .collect();
        let union = map.subject_union(&permissions);
        let intersect = map.subject_intersect(&permissions);

        for subject in intersect.keys() {
            prop_assert!(union.contains_key(subject), "{} in intersect but not union", subject);
        }
    }

    #[test]
    fn prop_revoke_wins_at_equal_weight(weight in -20i32..=0, permission in 0usize..3) {
        let permission = PERMISSIONS[permission];
        let index = GrantRevokeIndex::new(
            single(permission, "sid", weight),
            single(permission, "sid", weight),
        );
        prop_assert!(!index.has_permissions(&["sid"], &[permission]));

        let closer = index.override_by(&GrantRevokeIndex::new(
            single(permission, "sid", weight + 1),
            PermissionSubjectsMap::new(),
        ));
        prop_assert!(closer.has_permissions(&["sid"], &[permission]));
    }

    #[test]
    fn prop_closure_weight_is_negative_distance(
        declared in path(),
        below in path(),
        permission in 0usize..3,
    ) {
        let mut policy = Policy::new();
        policy.add_entry(
            PolicyEntry::new(Label::new("only").unwrap())
                .with_subject(SubjectId::new("sid").unwrap(), "test")
                .with_resource(
                    ResourceKey::new("thing", &format!("/{}", declared.join("/"))).unwrap(),
                    Permissions::new([PERMISSIONS[permission]]).unwrap(),
                    Permissions::none(),
                ),
        );
        let mut deepest: Vec<&str> = vec!["thing"];
        deepest.extend(declared.iter().copied());
        deepest.extend(below.iter().copied());
        policy.add_entry(
            PolicyEntry::new(Label::new("marker").unwrap())
                .with_subject(SubjectId::new("other").unwrap(), "test")
                .with_resource(
                    ResourceKey::new("thing", &format!("/{}", deepest[1..].join("/"))).unwrap(),
                    Permissions::new(["MARK"]).unwrap(),
                    Permissions::none(),
                ),
        );

        let closed = PolicyTrie::from_policy(&policy).transitive_closure();
        let mut node = closed
            .seek_to_exact_node(["thing"].into_iter().chain(declared.iter().copied()))
            .unwrap();
        let declared_depth = node.depth();
        for segment in &below {
            node = node.child(segment).unwrap();
            let expected = -((node.depth() - declared_depth) as i32);
            prop_assert_eq!(
                node.index().granted().weight(PERMISSIONS[permission], "sid"),
                Some(expected)
            );
        }
    }

    #[test]
    fn prop_closure_matches_uncached_walk(
        decls in declarations(),
        query in path(),
        permission in 0usize..3,
    ) {
        let policy = policy(&decls);
        let open = PolicyTrie::from_policy(&policy);
        let closed = open.transitive_closure();
        let permission = [PERMISSIONS[permission]];

        // walk the open trie, keeping the nearest declaration
        let mut keys = vec!["thing"];
        keys.extend(query.iter().copied());
        let mut node = open.root();
        let mut effective = GrantRevokeIndex::default();
        for key in &keys {
            match node.child(key) {
                Some(child) => {
                    effective = effective.copy_with_decremented_weight().override_by(child.index());
                    node = child;
                }
                None => break,
            }
        }

        let expected = effective.has_permissions(&["sid"], &permission);
        let actual = closed
            .seek_to_least_ancestor(keys.iter().copied())
            .index()
            .has_permissions(&["sid"], &permission);
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn prop_json_view_never_invents_fields(
        decls in declarations(),
        document in json_document(),
        permission in 0usize..3,
    ) {
        let closed = PolicyTrie::from_policy(&policy(&decls)).transitive_closure();
        let view =
            closed.build_json_view_at(["thing"], &document, &["sid"], &[PERMISSIONS[permission]]);
        prop_assert!(is_subview(&view, &document), "view {} not contained in {}", view, document);
    }
}
