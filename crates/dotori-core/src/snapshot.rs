//! The folder tree document served by the folder service, and its
//! conversion into a validated [`Tree`].
//!
//! ```json
//! {
//!   "rootId": "root",
//!   "items": {
//!     "root": { "id": "root", "children": ["12"], "data": "" },
//!     "12":   { "id": 12, "children": [], "isExpanded": false, "data": { "name": "Docs" } }
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::TreeError;
use crate::model::{NodeId, Tree, TreeNode};

/// Raw folder tree as fetched. Fields the view does not need are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub root_id: NodeId,
    #[serde(default)]
    pub items: HashMap<String, SnapshotItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub id: NodeId,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub is_expanded: Option<bool>,
    #[serde(default)]
    pub data: Option<ItemData>,
}

/// Item payload. The root usually carries a placeholder instead of a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemData {
    Folder {
        #[serde(default)]
        name: Option<String>,
    },
    Other(serde_json::Value),
}

impl SnapshotItem {
    fn into_node(self) -> TreeNode {
        let name = match self.data {
            Some(ItemData::Folder { name: Some(name) }) => name,
            _ => String::new(),
        };
        TreeNode {
            id: self.id,
            children: self.children,
            expanded: self.is_expanded.unwrap_or(false),
            name,
        }
    }
}

impl Tree {
    /// Normalize a fetched snapshot into a tree: absent flags become
    /// `false`, absent names become empty. Anything that would break the
    /// tree shape is rejected.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Tree, TreeError> {
        let mut nodes = Vec::with_capacity(snapshot.items.len());
        for (key, item) in snapshot.items {
            if key != item.id.as_str() {
                return Err(TreeError::KeyMismatch { key, id: item.id });
            }
            nodes.push(item.into_node());
        }
        Tree::from_nodes(snapshot.root_id, nodes)
    }
}

impl TryFrom<TreeSnapshot> for Tree {
    type Error = TreeError;

    fn try_from(snapshot: TreeSnapshot) -> Result<Self, Self::Error> {
        Tree::from_snapshot(snapshot)
    }
}
