//! Media tree node
//!
//! The mutable unit of navigation. A node wraps the latest classified kind
//! of one library item, its (possibly not yet loaded) children and two
//! loading tracks: one for the children listing, one for detail refreshes.
//!
//! Nodes are shared through [`NodeRef`]. Every holder of the handle sees the
//! same state; only the loader writes to it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::cache::NodeCache;
use crate::models::{NodeId, NodeKind};
use crate::Error;

/// Shared handle to a node. Cloning the handle never copies the node.
pub type NodeRef = Arc<MediaTreeNode>;

/// Load state of one track of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(Error),
}

impl LoadingState {
    /// Whether a fetch may start from this state.
    ///
    /// `Loaded` only re-enters `Loading` when the caller forces it; a load
    /// already in flight is never started twice.
    #[must_use]
    pub const fn can_begin(&self, forced: bool) -> bool {
        match self {
            Self::Idle | Self::Failed(_) => true,
            Self::Loaded => forced,
            Self::Loading => false,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The two independent load operations a node supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadTrack {
    Children,
    Detail,
}

/// Published to subscribers whenever a node changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeStatus {
    pub children: LoadingState,
    pub detail: LoadingState,
    pub revision: u64,
}

#[derive(Debug)]
struct NodeState {
    kind: NodeKind,
    children: Vec<NodeRef>,
    children_loaded: bool,
    children_state: LoadingState,
    detail_state: LoadingState,
    enriched: bool,
    revision: u64,
}

pub struct MediaTreeNode {
    id: NodeId,
    scope: u64,
    origin: Weak<NodeCache>,
    state: RwLock<NodeState>,
    status: watch::Sender<NodeStatus>,
}

impl MediaTreeNode {
    /// A fresh, idle node with no children, not registered in any cache.
    ///
    /// Detached nodes cannot be loaded; the loader needs the owning cache to
    /// wrap fetched children.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self::attached(Weak::new(), 0, id, kind)
    }

    /// A fresh node owned by the cache behind `origin`.
    pub(crate) fn attached(origin: Weak<NodeCache>, scope: u64, id: NodeId, kind: NodeKind) -> Self {
        let (status, _) = watch::channel(NodeStatus::default());
        Self {
            id,
            scope,
            origin,
            state: RwLock::new(NodeState {
                kind,
                children: Vec::new(),
                children_loaded: false,
                children_state: LoadingState::Idle,
                detail_state: LoadingState::Idle,
                enriched: false,
                revision: 0,
            }),
            status,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Session scope of the cache owning this node (0 when detached)
    #[must_use]
    pub const fn scope(&self) -> u64 {
        self.scope
    }

    /// Owning cache, if the node was created by one that is still alive.
    pub(crate) fn origin(&self) -> Option<Arc<NodeCache>> {
        self.origin.upgrade()
    }

    /// Latest known kind. Cheap: the raw item inside is shared.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.state.read().kind.clone()
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.state.read().kind.is_container()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.state.read().kind.is_leaf()
    }

    /// Snapshot of the children handles, in server order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeRef> {
        self.state.read().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.state.read().children.len()
    }

    /// Child with the given identity, if loaded.
    #[must_use]
    pub fn child(&self, id: &NodeId) -> Option<NodeRef> {
        self.state
            .read()
            .children
            .iter()
            .find(|child| child.id() == id)
            .cloned()
    }

    /// Whether a children listing ever succeeded. Distinguishes "no
    /// children" from "not loaded yet".
    #[must_use]
    pub fn children_loaded(&self) -> bool {
        self.state.read().children_loaded
    }

    #[must_use]
    pub fn loading_state(&self) -> LoadingState {
        self.state.read().children_state.clone()
    }

    #[must_use]
    pub fn detail_state(&self) -> LoadingState {
        self.state.read().detail_state.clone()
    }

    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.state.read().enriched
    }

    /// Observe state changes of this node.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NodeStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn title(&self) -> String {
        let state = self.state.read();
        match &state.kind {
            NodeKind::Root => "Library".to_string(),
            NodeKind::Unknown => "Unknown item".to_string(),
            kind => kind.raw().map(|raw| raw.name.clone()).unwrap_or_default(),
        }
    }

    /// Secondary line: episode numbering, owning series, or release year.
    #[must_use]
    pub fn subtitle(&self) -> Option<String> {
        let state = self.state.read();
        match &state.kind {
            NodeKind::Episode(raw) => {
                let numbering = match (raw.parent_index_number, raw.index_number) {
                    (Some(season), Some(episode)) => Some(format!("S{season:02}E{episode:02}")),
                    (None, Some(episode)) => Some(format!("E{episode:02}")),
                    _ => None,
                };
                match (numbering, raw.series_name.as_deref()) {
                    (Some(n), Some(series)) => Some(format!("{n} · {series}")),
                    (Some(n), None) => Some(n),
                    (None, series) => series.map(ToString::to_string),
                }
            }
            NodeKind::Season(raw) => raw.series_name.clone(),
            NodeKind::Movie(raw) | NodeKind::Series(raw) | NodeKind::BoxSet(raw) => {
                raw.production_year.map(|year| year.to_string())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn overview(&self) -> Option<String> {
        self.state
            .read()
            .kind
            .raw()
            .and_then(|raw| raw.overview.clone())
    }

    /// Move a track into `Loading`. Returns `false`, leaving the node
    /// untouched, when the transition is not allowed.
    pub(crate) fn begin(&self, track: LoadTrack, forced: bool) -> bool {
        {
            let mut state = self.state.write();
            let current = match track {
                LoadTrack::Children => &mut state.children_state,
                LoadTrack::Detail => &mut state.detail_state,
            };
            if !current.can_begin(forced) {
                tracing::debug!(node_id = %self.id, ?track, state = ?current, "Refusing to start load");
                return false;
            }
            *current = LoadingState::Loading;
        }
        self.publish();
        true
    }

    /// Assign a freshly fetched children listing.
    pub(crate) fn finish_children(&self, children: Vec<NodeRef>) {
        {
            let mut state = self.state.write();
            state.children = children;
            state.children_loaded = true;
            state.children_state = LoadingState::Loaded;
        }
        self.publish();
    }

    /// Replace the kind wholesale with fresher detail. Children are kept.
    pub(crate) fn finish_detail(&self, kind: NodeKind) {
        {
            let mut state = self.state.write();
            state.kind = kind;
            state.detail_state = LoadingState::Loaded;
        }
        self.publish();
    }

    /// Record a failed fetch. Children and kind stay as they were.
    pub(crate) fn fail(&self, track: LoadTrack, err: Error) {
        {
            let mut state = self.state.write();
            match track {
                LoadTrack::Children => state.children_state = LoadingState::Failed(err),
                LoadTrack::Detail => state.detail_state = LoadingState::Failed(err),
            }
        }
        self.publish();
    }

    pub(crate) fn mark_enriched(&self) {
        self.state.write().enriched = true;
    }

    fn publish(&self) {
        let status = {
            let mut state = self.state.write();
            state.revision += 1;
            NodeStatus {
                children: state.children_state.clone(),
                detail: state.detail_state.clone(),
                revision: state.revision,
            }
        };
        self.status.send_replace(status);
    }
}

impl PartialEq for MediaTreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaTreeNode {}

impl Hash for MediaTreeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MediaTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MediaTreeNode")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("kind", &state.kind.label())
            .field("children", &state.children.len())
            .field("children_loaded", &state.children_loaded)
            .field("children_state", &state.children_state)
            .field("detail_state", &state.detail_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify;
    use crate::test_helpers::{node, raw_item};

    #[test]
    fn test_loading_state_transitions() {
        assert!(LoadingState::Idle.can_begin(false));
        assert!(LoadingState::Failed(Error::Unknown("x".to_string())).can_begin(false));
        assert!(!LoadingState::Loaded.can_begin(false));
        assert!(LoadingState::Loaded.can_begin(true));
        assert!(!LoadingState::Loading.can_begin(true));
    }

    #[test]
    fn test_new_node_is_idle_and_empty() {
        let n = node("1", "Series", "Show");
        assert_eq!(n.loading_state(), LoadingState::Idle);
        assert_eq!(n.detail_state(), LoadingState::Idle);
        assert!(n.children().is_empty());
        assert!(!n.children_loaded());
        assert!(n.is_container());
    }

    #[test]
    fn test_begin_refuses_double_start() {
        let n = node("1", "Series", "Show");
        assert!(n.begin(LoadTrack::Children, false));
        assert!(!n.begin(LoadTrack::Children, true));
        // The detail track is independent.
        assert!(n.begin(LoadTrack::Detail, true));
    }

    #[test]
    fn test_failure_keeps_children() {
        let parent = node("1", "Season", "Season 1");
        let child = Arc::new(node("2", "Episode", "Pilot"));

        assert!(parent.begin(LoadTrack::Children, false));
        parent.finish_children(vec![child.clone()]);
        assert!(parent.begin(LoadTrack::Children, true));
        parent.fail(LoadTrack::Children, Error::NetworkUnavailable("down".to_string()));

        assert!(Arc::ptr_eq(&parent.children()[0], &child));
        assert!(parent.children_loaded());
        assert_eq!(
            parent.loading_state().error(),
            Some(&Error::NetworkUnavailable("down".to_string()))
        );
    }

    #[test]
    fn test_detail_replaces_kind_only() {
        let parent = node("1", "Series", "Old name");
        let child = Arc::new(node("2", "Season", "Season 1"));
        parent.finish_children(vec![child]);

        parent.finish_detail(classify(Some(&raw_item("1", "Series", "New name"))));

        assert_eq!(parent.title(), "New name");
        assert_eq!(parent.child_count(), 1);
        assert_eq!(parent.detail_state(), LoadingState::Loaded);
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let n = node("1", "Season", "Season 1");
        let rx = n.subscribe();

        n.begin(LoadTrack::Children, false);
        assert_eq!(rx.borrow().children, LoadingState::Loading);

        n.finish_children(Vec::new());
        let status = rx.borrow().clone();
        assert_eq!(status.children, LoadingState::Loaded);
        assert_eq!(status.revision, 2);
    }

    #[test]
    fn test_equality_by_id() {
        let a = node("7", "Movie", "A");
        let b = node("7", "Movie", "B");
        let c = node("8", "Movie", "A");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_subtitles() {
        let mut raw = raw_item("1", "Episode", "Pilot");
        raw.parent_index_number = Some(1);
        raw.index_number = Some(2);
        raw.series_name = Some("Show".to_string());
        let episode = MediaTreeNode::new(NodeId::from(&crate::models::ItemId::from("1")), classify(Some(&raw)));
        assert_eq!(episode.subtitle().as_deref(), Some("S01E02 · Show"));

        let mut raw = raw_item("2", "Movie", "Film");
        raw.production_year = Some(1999);
        let movie = MediaTreeNode::new(NodeId::from(&crate::models::ItemId::from("2")), classify(Some(&raw)));
        assert_eq!(movie.subtitle().as_deref(), Some("1999"));

        let root = MediaTreeNode::new(NodeId::root(), NodeKind::Root);
        assert_eq!(root.title(), "Library");
        assert_eq!(root.subtitle(), None);
    }
}
