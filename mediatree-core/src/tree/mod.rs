pub mod node;

pub use node::{LoadTrack, LoadingState, MediaTreeNode, NodeRef, NodeStatus};
