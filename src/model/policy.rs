//! Policy document structure
//!
//! A policy is an ordered list of labelled entries. Each entry names a set
//! of subjects and, per resource, the permissions granted to and revoked from
//! those subjects. The JSON form keeps declaration order:
//!
//! ```json
//! {
//!   "policyId": "org.example:lamp",
//!   "_revision": 3,
//!   "entries": {
//!     "owner": {
//!       "subjects": { "nginx:alice": { "type": "basic auth user" } },
//!       "resources": {
//!         "thing:/": { "grant": ["READ", "WRITE"], "revoke": [] }
//!       }
//!     }
//!   }
//! }
//! ```

use super::{Permissions, ResourceKey};
use crate::error::{PolicyError, Result};
use crate::validation::{Label, PolicyId, SubjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Permissions granted and revoked on one resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectedPermissions {
    #[serde(rename = "grant", default)]
    pub granted: Permissions,
    #[serde(rename = "revoke", default)]
    pub revoked: Permissions,
}

impl EffectedPermissions {
    pub fn new(granted: Permissions, revoked: Permissions) -> Self {
        EffectedPermissions { granted, revoked }
    }
}

/// Subject named by a policy entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    /// Free-form description of the subject kind
    pub subject_type: String,
}

/// Resource declaration of a policy entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub key: ResourceKey,
    pub permissions: EffectedPermissions,
}

/// One labelled entry of a policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    label: Label,
    subjects: Vec<Subject>,
    resources: Vec<Resource>,
}

impl PolicyEntry {
    /// Create an empty entry
    pub fn new(label: Label) -> Self {
        PolicyEntry {
            label,
            subjects: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Add a subject; a subject with the same id is replaced
    pub fn with_subject(mut self, id: SubjectId, subject_type: impl Into<String>) -> Self {
        let subject = Subject {
            id,
            subject_type: subject_type.into(),
        };
        match self.subjects.iter_mut().find(|s| s.id == subject.id) {
            Some(existing) => *existing = subject,
            None => self.subjects.push(subject),
        }
        self
    }

    /// Declare permissions on a resource; a resource with the same key is replaced
    pub fn with_resource(
        mut self,
        key: ResourceKey,
        granted: Permissions,
        revoked: Permissions,
    ) -> Self {
        let resource = Resource {
            key,
            permissions: EffectedPermissions::new(granted, revoked),
        };
        match self.resources.iter_mut().find(|r| r.key == resource.key) {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
        self
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn subject_ids(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.id.as_str())
    }
}

/// Complete policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDocument", into = "PolicyDocument")]
pub struct Policy {
    id: Option<PolicyId>,
    revision: i64,
    entries: Vec<PolicyEntry>,
}

impl Policy {
    /// Create a new empty policy without id
    pub fn new() -> Self {
        Policy::default()
    }

    pub fn with_id(mut self, id: PolicyId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_revision(mut self, revision: i64) -> Self {
        self.revision = revision;
        self
    }

    /// Add an entry to this policy
    ///
    /// An entry whose label is already present replaces the existing entry
    /// in place, keeping its declaration position.
    pub fn add_entry(&mut self, entry: PolicyEntry) {
        match self.entries.iter_mut().find(|e| e.label == entry.label) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn id(&self) -> Option<&PolicyId> {
        self.id.as_ref()
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[PolicyEntry] {
        &self.entries
    }

    pub fn entry(&self, label: &str) -> Option<&PolicyEntry> {
        self.entries.iter().find(|e| e.label.as_str() == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse policy from JSON string
    ///
    /// Malformed JSON yields `Serialization`; well-formed JSON with invalid
    /// labels, ids, keys or permissions yields the matching validation error.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: PolicyDocument = serde_json::from_str(json)?;
        Policy::try_from(document)
    }

    /// Serialize policy to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wire form of a policy; entries stay untyped until validated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    policy_id: Option<String>,
    #[serde(rename = "_revision", default)]
    revision: i64,
    #[serde(default)]
    entries: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EntryDocument {
    #[serde(default)]
    subjects: Map<String, Value>,
    #[serde(default)]
    resources: Map<String, Value>,
}

/// Raw permission names; validated into [`Permissions`] after parsing
#[derive(Debug, Deserialize)]
struct ResourceDocument {
    #[serde(default)]
    grant: Vec<String>,
    #[serde(default)]
    revoke: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubjectDocument {
    #[serde(rename = "type", default)]
    subject_type: String,
}

impl TryFrom<PolicyDocument> for Policy {
    type Error = PolicyError;

    fn try_from(document: PolicyDocument) -> Result<Self> {
        let mut policy = Policy {
            id: document.policy_id.map(PolicyId::new).transpose()?,
            revision: document.revision,
            entries: Vec::with_capacity(document.entries.len()),
        };

        for (label, value) in document.entries {
            let raw: EntryDocument = serde_json::from_value(value)?;
            let mut entry = PolicyEntry::new(Label::new(label)?);

            for (subject_id, subject) in raw.subjects {
                let subject: SubjectDocument = serde_json::from_value(subject)?;
                entry = entry.with_subject(SubjectId::new(subject_id)?, subject.subject_type);
            }

            for (key, permissions) in raw.resources {
                let raw: ResourceDocument = serde_json::from_value(permissions)?;
                entry = entry.with_resource(
                    key.parse()?,
                    Permissions::new(raw.grant)?,
                    Permissions::new(raw.revoke)?,
                );
            }

            policy.add_entry(entry);
        }

        Ok(policy)
    }
}

impl From<Policy> for PolicyDocument {
    fn from(policy: Policy) -> Self {
        let entries = policy
            .entries
            .into_iter()
            .map(|entry| {
                let subjects = entry
                    .subjects
                    .into_iter()
                    .map(|s| {
                        let mut subject = Map::new();
                        subject.insert("type".to_string(), Value::String(s.subject_type));
                        (s.id.into_string(), Value::Object(subject))
                    })
                    .collect::<Map<_, _>>();

                let resources = entry
                    .resources
                    .into_iter()
                    .map(|r| {
                        let mut effected = Map::new();
                        effected.insert(
                            "grant".to_string(),
                            permission_array(&r.permissions.granted),
                        );
                        effected.insert(
                            "revoke".to_string(),
                            permission_array(&r.permissions.revoked),
                        );
                        (r.key.to_string(), Value::Object(effected))
                    })
                    .collect::<Map<_, _>>();

                let mut object = Map::new();
                object.insert("subjects".to_string(), Value::Object(subjects));
                object.insert("resources".to_string(), Value::Object(resources));
                (entry.label.into_string(), Value::Object(object))
            })
            .collect();

        PolicyDocument {
            policy_id: policy.id.map(PolicyId::into_string),
            revision: policy.revision,
            entries,
        }
    }
}

fn permission_array(permissions: &Permissions) -> Value {
    Value::Array(
        permissions
            .iter()
            .map(|p| Value::String(p.to_string()))
            .collect(),
    )
}
