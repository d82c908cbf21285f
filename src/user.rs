//! Per-session user trees.
//!
//! A [`UserTree`] is the part of the master tree one identity may see. It is
//! produced by copying the master tree top-down and dropping every page the
//! identity is denied, together with everything below it:
//!
//! ```text
//! master                        user (guest)
//!
//! home (public)                 home
//! ├─ account (authenticated)    └─ faq
//! │  └─ help (public)              (account denied, help pruned with it)
//! └─ faq (public)
//! ```
//!
//! The tree remembers whether it has been built. [`UserTreeBuilder::build`]
//! does nothing on a loaded tree until [`UserTreeBuilder::invalidate`] clears it,
//! which is what the session calls when its identity changes.

#[path = "user/access.rs"]
pub mod access;
#[path = "user/builder.rs"]
pub mod builder;

pub use access::{PagePermission, StaticSubject, Subject, WildcardPermission, is_accessible};
pub use builder::{BuildOutcome, Transform, UserTreeBuilder, project};

use crate::AccessMode;
use crate::master::{MasterNode, NodeId};
use crate::registry::{LabelKey, ViewId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A page as one session sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNode {
    pub uri: String,
    pub segment: String,
    pub view: Option<ViewId>,
    pub label_key: Option<LabelKey>,
    pub roles: BTreeSet<String>,
    pub access: AccessMode,
    /// Display label, filled in by a transform when one is configured.
    pub label: Option<String>,
}

impl From<&MasterNode> for UserNode {
    fn from(node: &MasterNode) -> Self {
        UserNode {
            uri: node.uri().to_string(),
            segment: node.segment().to_string(),
            view: node.view().cloned(),
            label_key: node.label_key().cloned(),
            roles: node.roles().clone(),
            access: node.access(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    node: UserNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTree {
    slots: Vec<Slot>,
    by_uri: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    loaded: bool,
}

impl UserTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Drop every node and mark the tree as not loaded.
    pub fn clear(&mut self) {
        *self = UserTree::default();
    }

    /// Add `node` below `parent`, or as a root.
    pub(crate) fn append(&mut self, parent: Option<NodeId>, node: UserNode) -> NodeId {
        let id = self.slots.len();
        self.by_uri.insert(node.uri.clone(), id);
        self.slots.push(Slot { node, parent, children: Vec::new() });
        match parent {
            Some(parent) => self.slots[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn node(&self, uri: &str) -> Option<&UserNode> {
        self.by_uri.get(uri).map(|&id| &self.slots[id].node)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.by_uri.contains_key(uri)
    }

    /// Nodes in the order they were copied, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &UserNode> {
        self.slots.iter().map(|slot| &slot.node)
    }

    pub fn roots(&self) -> impl Iterator<Item = &UserNode> {
        self.roots.iter().map(|&id| &self.slots[id].node)
    }

    pub fn children(&self, uri: &str) -> impl Iterator<Item = &UserNode> {
        let ids = self.by_uri.get(uri).map(|&id| self.slots[id].children.as_slice()).unwrap_or(&[]);
        ids.iter().map(|&id| &self.slots[id].node)
    }

    pub fn parent(&self, uri: &str) -> Option<&UserNode> {
        let id = *self.by_uri.get(uri)?;
        self.slots[id].parent.map(|parent| &self.slots[parent].node)
    }
}
