//! Arena-backed trie over resource paths
//!
//! Every node corresponds to one resource-path prefix `[type, segment, ...]`
//! and owns the [`GrantRevokeIndex`] declared on exactly that prefix. Nodes
//! live in a `Vec` and address their children by [`NodeId`]; a child is
//! always allocated after its parent, so ids grow along every path.
//!
//! ```text
//! root
//!  └─ "thing"                    grant READ,WRITE {sid_1}; revoke WRITE {sid_3}
//!      └─ "attributes"           grant READ,WRITE {sid_3}
//!      └─ "features"
//!          └─ "lamp"             ...
//! ```
//!
//! A built trie is immutable. [`PolicyTrie::transitive_closure`] derives a new
//! trie with the same topology in which every node's index already contains
//! its ancestors' declarations, weight-decremented once per level and
//! overridden by what the node declares itself. Topology and untouched
//! indices are shared with the source trie through `Arc`.

use super::index::GrantRevokeIndex;
use super::subjects_map::PermissionSubjectsMap;
use crate::model::Policy;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Position of a node in the trie arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    index: Arc<GrantRevokeIndex>,
    children: Arc<BTreeMap<String, NodeId>>,
    depth: usize,
}

/// Trie of grant/revoke indices keyed by resource-path segments
#[derive(Debug, Clone)]
pub struct PolicyTrie {
    nodes: Vec<Node>,
    closed: bool,
}

impl Default for PolicyTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTrie {
    /// Trie with only the root node
    pub fn new() -> Self {
        PolicyTrie {
            nodes: vec![Node::default()],
            closed: false,
        }
    }

    /// Build the trie of a policy
    ///
    /// Each resource of each entry is inserted at the node of its key. The
    /// entry's subjects are related to the granted and revoked permissions
    /// at weight 0, and the result overrides whatever earlier entries
    /// declared on the same node: for an overlapping subject and permission
    /// the later entry wins. Within one entry a grant and a revoke of the
    /// same permission both stay, so the revoke wins.
    pub fn from_policy(policy: &Policy) -> Self {
        let mut trie = PolicyTrie::new();
        let mut declarations = 0usize;

        for entry in policy.entries() {
            let subjects: Vec<&str> = entry.subject_ids().collect();
            for resource in entry.resources() {
                let mut granted = PermissionSubjectsMap::builder();
                granted.add_total_relation_of_weight_zero(
                    resource.permissions.granted.as_slice(),
                    &subjects,
                );
                let mut revoked = PermissionSubjectsMap::builder();
                revoked.add_total_relation_of_weight_zero(
                    resource.permissions.revoked.as_slice(),
                    &subjects,
                );
                let declared = GrantRevokeIndex::new(granted.build(), revoked.build());

                let id = trie.get_or_create(resource.key.segments());
                let node = &mut trie.nodes[id];
                node.index = Arc::new(node.index.override_by(&declared));
                declarations += 1;
            }
        }

        debug!(
            "Built policy trie with {} nodes from {} entries ({} resource declarations)",
            trie.nodes.len(),
            policy.len(),
            declarations
        );
        trie
    }

    /// Walk the path, creating missing nodes, and return the terminal node
    fn get_or_create<I, S>(&mut self, keys: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = ROOT;
        for key in keys {
            let key = key.as_ref();
            current = match self.nodes[current].children.get(key).copied() {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    let depth = self.nodes[current].depth + 1;
                    self.nodes.push(Node {
                        depth,
                        ..Node::default()
                    });
                    Arc::make_mut(&mut self.nodes[current].children).insert(key.to_string(), child);
                    child
                }
            };
        }
        current
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            trie: self,
            id: ROOT,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { trie: self, id })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True for tries produced by [`PolicyTrie::transitive_closure`]
    pub fn is_transitively_closed(&self) -> bool {
        self.closed
    }

    /// Node of exactly this path, if every segment exists
    pub fn seek_to_exact_node<I, S>(&self, keys: I) -> Option<NodeRef<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (node, exact) = self.seek(keys);
        exact.then_some(node)
    }

    /// Deepest existing node on this path
    ///
    /// Stops at the last node that exists, so the root is returned when not
    /// even the first segment matches.
    pub fn seek_to_least_ancestor<I, S>(&self, keys: I) -> NodeRef<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.seek(keys).0
    }

    /// Deepest existing node and whether the whole path was consumed
    pub(crate) fn seek<I, S>(&self, keys: I) -> (NodeRef<'_>, bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.root();
        for key in keys {
            match current.child(key.as_ref()) {
                Some(child) => current = child,
                None => return (current, false),
            }
        }
        (current, true)
    }

    /// Trie whose indices include everything inherited from ancestors
    ///
    /// The closed index of a node is its parent's closed index, decremented
    /// by one, overridden by the node's own declarations. Nearest
    /// declaration wins; at equal distance revoke wins. Calling this on an
    /// already closed trie returns a copy.
    pub fn transitive_closure(&self) -> PolicyTrie {
        if self.closed {
            return self.clone();
        }

        let mut closed: Vec<Arc<GrantRevokeIndex>> = vec![Arc::default(); self.nodes.len()];
        closed[ROOT] = Arc::clone(&self.nodes[ROOT].index);

        // parents precede children in the arena
        for (id, node) in self.nodes.iter().enumerate() {
            let inherited = Arc::clone(&closed[id]);
            for &child in node.children.values() {
                let local = &self.nodes[child].index;
                closed[child] = if inherited.is_empty() {
                    Arc::clone(local)
                } else {
                    Arc::new(inherited.copy_with_decremented_weight().override_by(local))
                };
            }
        }

        let nodes = self
            .nodes
            .iter()
            .zip(closed)
            .map(|(node, index)| Node {
                index,
                children: Arc::clone(&node.children),
                depth: node.depth,
            })
            .collect::<Vec<_>>();

        debug!("Computed transitive closure over {} nodes", nodes.len());
        PolicyTrie {
            nodes,
            closed: true,
        }
    }
}

/// Borrowed handle to one trie node
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    trie: &'a PolicyTrie,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Number of segments between the root and this node
    pub fn depth(&self) -> usize {
        self.node().depth
    }

    pub fn index(&self) -> &'a GrantRevokeIndex {
        &self.node().index
    }

    pub fn child(&self, key: &str) -> Option<NodeRef<'a>> {
        self.node().children.get(key).map(|&id| NodeRef {
            trie: self.trie,
            id,
        })
    }

    /// Direct children in key order
    pub fn children(&self) -> impl Iterator<Item = (&'a str, NodeRef<'a>)> + 'a {
        let trie = self.trie;
        self.node()
            .children
            .iter()
            .map(move |(key, &id)| (key.as_str(), NodeRef { trie, id }))
    }

    pub fn is_leaf(&self) -> bool {
        self.node().children.is_empty()
    }

    /// Every node below this one, depth first
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            trie: self.trie,
            stack: self.node().children.values().rev().copied().collect(),
        }
    }

    fn node(&self) -> &'a Node {
        &self.trie.nodes[self.id]
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("depth", &self.depth())
            .field("children", &self.node().children.len())
            .finish()
    }
}

/// Depth-first iterator over a subtree, excluding its root
pub struct Descendants<'a> {
    trie: &'a PolicyTrie,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.trie.nodes[id];
        self.stack.extend(node.children.values().rev().copied());
        Some(NodeRef {
            trie: self.trie,
            id,
        })
    }
}
