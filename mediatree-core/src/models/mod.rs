pub mod id;
pub mod kind;

pub use id::{generate_id, ItemId, NodeId, ROOT_NODE_ID};
pub use kind::{classify, NodeKind};

/// Item record as fetched from the server, before classification.
pub use mediatree_providers::emby::Item as RawItem;
