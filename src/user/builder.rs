//! Building a [`UserTree`] from the published master tree.
//!
//! The copy is a pre-order walk: a page is visited only after its parent was
//! included, so a denied page takes its whole subtree with it. Each visit is
//! [`project`], a pure function of the master node, the subject and the
//! transform.
//!
//! Subject and tree share one lock. `build`, `invalidate` and
//! `switch_subject` therefore never interleave, and readers never see a
//! half-copied tree.

use super::access::{Subject, is_accessible};
use super::{UserNode, UserTree};
use crate::master::{MasterNode, NodeId, SharedMasterTree};
use parking_lot::Mutex;
use std::sync::Arc;

/// Turns a master node into the candidate user node.
pub type Transform = Arc<dyn Fn(&MasterNode) -> UserNode + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The tree was already built; nothing was copied.
    AlreadyLoaded,
    /// `pruned` counts every master node left out, denied pages and their descendants alike.
    Built { included: usize, pruned: usize },
}

/// Project one master node for `subject`, or `None` when it is denied.
///
/// The decision uses the transformed node, so a transform may tighten or relax
/// a page's policy for the session. A transform cannot move a page: the URI is
/// always the master node's.
pub fn project(node: &MasterNode, subject: &dyn Subject, transform: &dyn Fn(&MasterNode) -> UserNode) -> Option<UserNode> {
    let mut candidate = transform(node);
    if candidate.uri != node.uri() {
        tracing::trace!(uri = node.uri(), rewritten = candidate.uri.as_str(), "transform changed the uri, restored");
        candidate.uri = node.uri().to_string();
    }
    is_accessible(candidate.access, &candidate.uri, &candidate.roles, subject).then_some(candidate)
}

struct Session {
    subject: Box<dyn Subject>,
    tree: UserTree,
}

pub struct UserTreeBuilder {
    master: SharedMasterTree,
    transform: Transform,
    session: Mutex<Session>,
}

impl UserTreeBuilder {
    pub fn new(master: SharedMasterTree, subject: impl Subject + 'static) -> Self {
        UserTreeBuilder {
            master,
            transform: Arc::new(|node: &MasterNode| UserNode::from(node)),
            session: Mutex::new(Session { subject: Box::new(subject), tree: UserTree::new() }),
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&MasterNode) -> UserNode + Send + Sync + 'static,
    {
        self.transform = Arc::new(transform);
        self
    }

    /// Copy the current master tree, unless the user tree is already loaded.
    pub fn build(&self) -> BuildOutcome {
        let mut session = self.session.lock();
        if session.tree.is_loaded() {
            return BuildOutcome::AlreadyLoaded;
        }

        let master = self.master.snapshot();
        let Session { subject, tree } = &mut *session;
        let mut included = 0;

        let roots: Vec<&MasterNode> = master.roots().collect();
        let mut pending: Vec<(&MasterNode, Option<NodeId>)> = roots.into_iter().rev().map(|n| (n, None)).collect();
        while let Some((node, parent)) = pending.pop() {
            let Some(user_node) = project(node, &**subject, &*self.transform) else {
                tracing::trace!(uri = node.uri(), "page denied, subtree pruned");
                continue;
            };
            let id = tree.append(parent, user_node);
            included += 1;
            let children: Vec<&MasterNode> = master.children(node).collect();
            pending.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }
        tree.mark_loaded();

        let pruned = master.node_count() - included;
        tracing::debug!(included, pruned, "user tree built");
        BuildOutcome::Built { included, pruned }
    }

    /// Clear the user tree so the next `build` copies again.
    pub fn invalidate(&self) {
        self.session.lock().tree.clear();
        tracing::debug!("user tree invalidated");
    }

    /// Replace the identity and clear the tree in one step.
    pub fn switch_subject(&self, subject: impl Subject + 'static) {
        let mut session = self.session.lock();
        session.subject = Box::new(subject);
        session.tree.clear();
        tracing::debug!("subject switched, user tree invalidated");
    }

    pub fn is_loaded(&self) -> bool {
        self.session.lock().tree.is_loaded()
    }

    pub fn snapshot(&self) -> UserTree {
        self.session.lock().tree.clone()
    }

    /// Run `f` against the tree while holding the session lock.
    pub fn with_tree<R>(&self, f: impl FnOnce(&UserTree) -> R) -> R {
        f(&self.session.lock().tree)
    }
}
