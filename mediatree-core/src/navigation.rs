//! Navigation store
//!
//! Drill-down stack from the library root to the node currently viewed,
//! plus the transient detail, overlay and search result sets. The store
//! only holds shared handles; nodes are owned by the session's cache and
//! never point back here.
//!
//! Mutated only by explicit navigation events. Background loads write into
//! nodes, never into the store, and the store never handles load errors.

use std::sync::Arc;

use crate::models::NodeId;
use crate::session::Session;
use crate::tree::NodeRef;

#[derive(Debug)]
pub struct NavigationStore {
    session: Arc<Session>,
    root: Option<NodeRef>,
    stack: Vec<NodeRef>,
    detail: Option<NodeRef>,
    overlay: Option<NodeRef>,
    search_results: Option<Vec<NodeRef>>,
}

impl NavigationStore {
    /// Store opened on the session's current root
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        let root = session.root();
        Self {
            session,
            root: Some(root),
            stack: Vec::new(),
            detail: None,
            overlay: None,
            search_results: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    #[must_use]
    pub const fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    /// Entries from the first level below the root to the current node
    #[must_use]
    pub fn stack(&self) -> &[NodeRef] {
        &self.stack
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Deepest entry, or the root when nothing has been opened yet
    #[must_use]
    pub fn current(&self) -> Option<&NodeRef> {
        self.stack.last().or(self.root.as_ref())
    }

    /// Titles from the root down, for breadcrumbs
    #[must_use]
    pub fn path(&self) -> Vec<String> {
        self.root
            .iter()
            .chain(self.stack.iter())
            .map(|node| node.title())
            .collect()
    }

    /// Append a node. Pushing a node already on the stack is allowed.
    pub fn push(&mut self, node: NodeRef) {
        tracing::debug!(node_id = %node.id(), depth = self.stack.len() + 1, "Push");
        self.stack.push(node);
    }

    /// Remove the last entry. No-op on an empty stack.
    pub fn pop(&mut self) -> Option<NodeRef> {
        let popped = self.stack.pop();
        if let Some(node) = &popped {
            tracing::debug!(node_id = %node.id(), depth = self.stack.len(), "Pop");
        }
        popped
    }

    /// Keep entries `0..=to_level` and drop everything deeper.
    pub fn truncate(&mut self, to_level: usize) {
        self.stack.truncate(to_level.saturating_add(1));
    }

    /// Multi-column selection: a pick in `column` replaces everything from
    /// that column on.
    pub fn select_in_column(&mut self, column: usize, node: NodeRef) {
        self.stack.truncate(column);
        self.push(node);
    }

    /// Open the loaded child `child_id` of the current node.
    ///
    /// Returns `None`, leaving the stack as it was, when the current node
    /// has no such child (not loaded yet or reloaded without it).
    pub fn select_child(&mut self, child_id: &NodeId) -> Option<NodeRef> {
        let child = self.current()?.child(child_id)?;
        self.push(child.clone());
        Some(child)
    }

    /// Fresh root load. The old path does not belong to the new root.
    pub fn set_root(&mut self, root: NodeRef) {
        tracing::debug!(node_id = %root.id(), dropped = self.stack.len(), "Root replaced");
        self.root = Some(root);
        self.stack.clear();
    }

    /// Reopen on the session's current root, e.g. after a session reset
    pub fn open_session_root(&mut self) {
        let root = self.session.root();
        self.set_root(root);
    }

    /// Forget everything: logout, server switch, re-authentication.
    pub fn reset(&mut self) {
        self.root = None;
        self.stack.clear();
        self.detail = None;
        self.overlay = None;
        self.search_results = None;
    }

    #[must_use]
    pub const fn detail(&self) -> Option<&NodeRef> {
        self.detail.as_ref()
    }

    pub fn set_detail(&mut self, node: NodeRef) {
        self.detail = Some(node);
    }

    pub fn clear_detail(&mut self) {
        self.detail = None;
    }

    /// Node opened for inline preview
    #[must_use]
    pub const fn overlay(&self) -> Option<&NodeRef> {
        self.overlay.as_ref()
    }

    pub fn set_overlay(&mut self, node: NodeRef) {
        self.overlay = Some(node);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    /// Show a flat result set. The stack is left alone.
    pub fn set_search_results(&mut self, results: Vec<NodeRef>) {
        self.search_results = Some(results);
    }

    pub fn clear_search_results(&mut self) {
        self.search_results = None;
    }

    #[must_use]
    pub fn search_results(&self) -> Option<&[NodeRef]> {
        self.search_results.as_deref()
    }

    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.search_results.is_some()
    }
}
