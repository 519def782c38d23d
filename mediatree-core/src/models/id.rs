use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// Sentinel id of the library root node.
pub const ROOT_NODE_ID: &str = "root";

/// Generate a 12-character nanoid for synthetic node IDs
pub fn generate_id() -> String {
    nanoid!(12)
}

/// Server-side item ID, stable across fetches
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a navigation node.
///
/// Usually the item id. The root uses [`ROOT_NODE_ID`]; nodes of an
/// unrecognised type get a fresh synthetic id so two of them never compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    #[must_use]
    pub fn synthetic() -> Self {
        Self(format!("unknown-{}", generate_id()))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_NODE_ID
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&ItemId> for NodeId {
    fn from(id: &ItemId) -> Self {
        Self(id.0.clone())
    }
}

impl PartialEq<ItemId> for NodeId {
    fn eq(&self, other: &ItemId) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ids_are_unique() {
        let a = NodeId::synthetic();
        let b = NodeId::synthetic();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("unknown-"));
        assert!(!a.is_root());
    }

    #[test]
    fn test_node_id_from_item_id() {
        let item = ItemId::from("abc");
        let node = NodeId::from(&item);
        assert_eq!(node, item);
        assert_eq!(node.to_string(), "abc");
        assert!(NodeId::root().is_root());
    }
}
