//! The master tree: every page the application defines.
//!
//! Nodes live in an arena (`Vec<MasterNode>`) and refer to each other by
//! [`NodeId`]; a `HashMap` from full URI to id enforces URI uniqueness.
//!
//! ```text
//! roots: [home, shop]
//!
//! home ─┬─ home/about ── home/about/team
//!       └─ home/contact
//! shop
//!
//! redirects: { old -> home }
//! ```
//!
//! ## Publication
//!
//! A `MasterTree` is only ever mutated while it is private to the loader.
//! Readers go through [`SharedMasterTree`], which hands out `Arc` snapshots;
//! a reload builds a fresh tree and swaps the reference in one write.

use crate::AccessMode;
use crate::registry::{LabelKey, ViewId};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Index of a node in its tree's arena.
pub type NodeId = usize;

/// Attributes of a page, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeRecord {
    pub uri: String,
    pub segment: String,
    pub view: Option<ViewId>,
    pub label_key: Option<LabelKey>,
    pub roles: BTreeSet<String>,
    pub access: AccessMode,
}

impl NodeRecord {
    /// Minimal record for an ancestor that was never declared.
    fn synthesized(uri: &str) -> Self {
        let segment = uri.rsplit('/').next().unwrap_or(uri);
        NodeRecord { uri: uri.to_string(), segment: segment.to_string(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterNode {
    #[serde(skip)]
    id: NodeId,
    #[serde(skip)]
    parent: Option<NodeId>,
    #[serde(skip)]
    children: Vec<NodeId>,
    #[serde(flatten)]
    record: NodeRecord,
}

impl MasterNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn uri(&self) -> &str {
        &self.record.uri
    }

    pub fn segment(&self) -> &str {
        &self.record.segment
    }

    pub fn view(&self) -> Option<&ViewId> {
        self.record.view.as_ref()
    }

    pub fn label_key(&self) -> Option<&LabelKey> {
        self.record.label_key.as_ref()
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.record.roles
    }

    pub fn access(&self) -> AccessMode {
        self.record.access
    }

    pub fn record(&self) -> &NodeRecord {
        &self.record
    }

    /// Number of segments in the URI; roots have depth 1.
    pub fn depth(&self) -> usize {
        self.record.uri.split('/').count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterTree {
    nodes: Vec<MasterNode>,
    by_uri: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    redirects: BTreeMap<String, String>,
}

impl MasterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the node at `record.uri`.
    ///
    /// Missing ancestors are created with default attributes. An existing node
    /// keeps its id and children; only its attributes are replaced.
    pub fn append(&mut self, record: NodeRecord) -> NodeId {
        if let Some(&id) = self.by_uri.get(&record.uri) {
            self.nodes[id].record = record;
            return id;
        }

        let parent = match record.uri.rfind('/') {
            Some(at) => {
                let parent_uri = &record.uri[..at];
                let parent_id = match self.by_uri.get(parent_uri) {
                    Some(&id) => id,
                    None => self.append(NodeRecord::synthesized(parent_uri)),
                };
                Some(parent_id)
            }
            None => None,
        };

        let id = self.nodes.len();
        self.by_uri.insert(record.uri.clone(), id);
        self.nodes.push(MasterNode { id, parent, children: Vec::new(), record });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Last write wins for a given `from`.
    pub fn add_redirect(&mut self, from: &str, to: &str) {
        self.redirects.insert(from.to_string(), to.to_string());
    }

    /// Every node, in no particular order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &MasterNode> {
        self.nodes.iter()
    }

    pub fn node(&self, uri: &str) -> Option<&MasterNode> {
        self.by_uri.get(uri).map(|&id| &self.nodes[id])
    }

    pub fn get(&self, id: NodeId) -> Option<&MasterNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &MasterNode> {
        self.roots.iter().map(|&id| &self.nodes[id])
    }

    pub fn children(&self, node: &MasterNode) -> impl Iterator<Item = &MasterNode> {
        node.children.iter().map(|&id| &self.nodes[id])
    }

    pub fn parent(&self, node: &MasterNode) -> Option<&MasterNode> {
        node.parent.map(|id| &self.nodes[id])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the deepest node, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(MasterNode::depth).max().unwrap_or(0)
    }

    pub fn redirects(&self) -> &BTreeMap<String, String> {
        &self.redirects
    }

    /// Single-hop redirect target for `uri`.
    pub fn redirect_for(&self, uri: &str) -> Option<&str> {
        self.redirects.get(uri).map(String::as_str)
    }

    /// Follow redirects from `uri` until a URI that is not redirected.
    ///
    /// A cycle stops at the last URI before it would repeat.
    pub fn resolve_redirects<'a>(&'a self, uri: &'a str) -> &'a str {
        let mut current = uri;
        let mut visited: HashSet<&str> = HashSet::from([uri]);
        while let Some(next) = self.redirect_for(current) {
            if !visited.insert(next) {
                break;
            }
            current = next;
        }
        current
    }
}

/// The published master tree, shared by the loader and every session.
#[derive(Debug, Clone, Default)]
pub struct SharedMasterTree {
    current: Arc<RwLock<Arc<MasterTree>>>,
}

impl SharedMasterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree as currently published.
    pub fn snapshot(&self) -> Arc<MasterTree> {
        Arc::clone(&self.current.read())
    }

    /// Make `tree` visible to readers, returning the tree it replaces.
    pub fn publish(&self, tree: MasterTree) -> Arc<MasterTree> {
        let next = Arc::new(tree);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
