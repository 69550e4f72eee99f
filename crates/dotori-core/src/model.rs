use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TreeError;

// ── NodeId ───────────────────────────────────────────────────────────

/// Opaque folder identifier, unique across the whole tree.
///
/// The folder service hands out ids as strings or numbers; both are kept as
/// their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => Self(s),
            Wire::Signed(n) => Self(n.to_string()),
            Wire::Unsigned(n) => Self(n.to_string()),
        })
    }
}

// ── TreeNode ─────────────────────────────────────────────────────────

/// A single folder: ordered children, display name and local expand state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub children: Vec<NodeId>,
    /// Local UI state only, never sent to the folder service.
    pub expanded: bool,
    pub name: String,
}

impl TreeNode {
    /// A collapsed folder with no children.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            expanded: false,
            name: name.into(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

// ── Tree ─────────────────────────────────────────────────────────────

/// The folder hierarchy below a synthetic root.
///
/// Nodes are shared between tree values: every update builds a new `Tree`
/// that reuses the `Arc` of each node it did not touch. Two trees are the
/// same value when [`Tree::ptr_eq`] holds, which is what the view uses to
/// decide whether to redraw.
#[derive(Debug, Clone)]
pub struct Tree {
    root_id: NodeId,
    nodes: Arc<HashMap<NodeId, Arc<TreeNode>>>,
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root_id == other.root_id
            && (Arc::ptr_eq(&self.nodes, &other.nodes) || self.nodes == other.nodes)
    }
}

impl Eq for Tree {}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

impl Tree {
    /// The root-only tree shown before the first snapshot arrives.
    pub fn empty() -> Self {
        Self::with_root(NodeId::new(""))
    }

    /// A tree holding nothing but its synthetic root.
    pub fn with_root(root_id: NodeId) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), Arc::new(TreeNode::new(root_id.clone(), "")));
        Self {
            root_id,
            nodes: Arc::new(nodes),
        }
    }

    /// Build a tree from loose nodes, rejecting anything that breaks the
    /// tree shape.
    pub fn from_nodes(
        root_id: NodeId,
        nodes: impl IntoIterator<Item = TreeNode>,
    ) -> Result<Self, TreeError> {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.id.clone(), Arc::new(node)))
            .collect();
        let tree = Self {
            root_id,
            nodes: Arc::new(nodes),
        };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.root_id == *id
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.node(&self.root_id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, the synthetic root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for the root-only tree.
    pub fn is_empty(&self) -> bool {
        self.root().is_none_or(|root| root.children.is_empty())
    }

    pub fn children_len(&self, id: &NodeId) -> Option<usize> {
        self.node(id).map(|node| node.children.len())
    }

    /// Find the parent of a node by scanning every children list.
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes
            .values()
            .find(|node| node.children.contains(id))
            .map(|node| &node.id)
    }

    /// Whether both trees are the very same value, not just equal content.
    pub fn ptr_eq(a: &Tree, b: &Tree) -> bool {
        a.root_id == b.root_id && Arc::ptr_eq(&a.nodes, &b.nodes)
    }

    /// Check every shape invariant: the root exists and is nobody's child,
    /// each child id exists and has exactly one parent, and no node is its
    /// own ancestor.
    pub fn validate(&self) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&self.root_id) {
            return Err(TreeError::MissingRoot(self.root_id.clone()));
        }

        let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
        for (key, node) in self.nodes.iter() {
            if *key != node.id {
                return Err(TreeError::KeyMismatch {
                    key: key.to_string(),
                    id: node.id.clone(),
                });
            }
            for child in &node.children {
                if !self.nodes.contains_key(child) {
                    return Err(TreeError::DanglingChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }
                if *child == self.root_id {
                    return Err(TreeError::RootAsChild(child.clone()));
                }
                if parents.insert(child, &node.id).is_some() {
                    return Err(TreeError::DuplicateChild(child.clone()));
                }
            }
        }

        // Every node has at most one parent, so walking upwards either ends
        // at a parentless node or comes back around.
        for start in self.nodes.keys() {
            let mut seen = HashSet::new();
            let mut current = start;
            while let Some(parent) = parents.get(current) {
                if !seen.insert(*parent) {
                    return Err(TreeError::Cycle((*parent).clone()));
                }
                current = *parent;
            }
        }

        Ok(())
    }

    /// A tree with `id`'s expand flag set. Returns this very tree when `id`
    /// is unknown or the flag already has that value.
    pub fn with_expanded(&self, id: &NodeId, expanded: bool) -> Tree {
        match self.node(id) {
            Some(node) if node.expanded != expanded => {
                let mut updated = node.clone();
                updated.expanded = expanded;
                self.replacing([updated])
            }
            _ => self.clone(),
        }
    }

    /// A tree with `node` appended as the last child of `parent_id`.
    ///
    /// A parent other than the synthetic root is expanded so the new child is
    /// visible. The new node must not already exist and must not bring
    /// children of its own.
    pub fn with_child(&self, parent_id: &NodeId, node: TreeNode) -> Result<Tree, TreeError> {
        let parent = self
            .node(parent_id)
            .ok_or_else(|| TreeError::UnknownParent(parent_id.clone()))?;
        if self.contains(&node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }
        if node.has_children() {
            return Err(TreeError::PopulatedNode(node.id));
        }

        let mut parent = parent.clone();
        parent.children.push(node.id.clone());
        if !self.is_root(parent_id) {
            parent.expanded = true;
        }
        Ok(self.replacing([parent, node]))
    }

    fn replacing(&self, updated: impl IntoIterator<Item = TreeNode>) -> Tree {
        let mut nodes = HashMap::clone(&self.nodes);
        for node in updated {
            nodes.insert(node.id.clone(), Arc::new(node));
        }
        Tree {
            root_id: self.root_id.clone(),
            nodes: Arc::new(nodes),
        }
    }

    /// Shared handle of a node, for checking which nodes an update reused.
    #[cfg(test)]
    pub(crate) fn node_arc(&self, id: &NodeId) -> Option<&Arc<TreeNode>> {
        self.nodes.get(id)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
