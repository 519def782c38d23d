//! Media library navigation core
//!
//! Lazy, cached tree model over an Emby or Jellyfin library: one canonical
//! node per item per session, coalesced loads, and a drill-down navigation
//! store.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod session;
pub mod source;
pub mod tree;

#[cfg(test)]
pub mod test_helpers;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use loader::LazyLoader;
pub use models::{classify, ItemId, NodeId, NodeKind, RawItem};
pub use navigation::NavigationStore;
pub use session::Session;
pub use source::{ChildFilters, EmbyItemSource, ItemSource};
pub use tree::{LoadTrack, LoadingState, MediaTreeNode, NodeRef, NodeStatus};
