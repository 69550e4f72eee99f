use tracing::{debug, info};

use crate::error::TreeError;
use crate::model::{NodeId, Tree, TreeNode};

/// Sole owner of the canonical folder tree.
///
/// Every operation swaps in a new [`Tree`] value instead of editing nodes in
/// place, and an operation that changes nothing keeps the current value.
/// Readers can hold on to [`TreeStore::snapshot`] and compare it with
/// [`Tree::ptr_eq`] or [`TreeStore::revision`] to know when to redraw.
#[derive(Debug, Default)]
pub struct TreeStore {
    tree: Tree,
    revision: u64,
}

impl TreeStore {
    /// A store holding the root-only tree.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// A cheap handle on the current tree value.
    pub fn snapshot(&self) -> Tree {
        self.tree.clone()
    }

    /// Bumped every time the tree value is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the whole tree with a fetched one. Local expand state is
    /// dropped. Loading a tree equal to the current one changes nothing.
    pub fn load(&mut self, tree: Tree) -> bool {
        if tree == self.tree {
            debug!("folder tree unchanged, keeping current value");
            return false;
        }
        info!(nodes = tree.len(), root = %tree.root_id(), "folder tree loaded");
        self.replace(tree)
    }

    /// Set a node's expand flag. Unknown ids are ignored: a gesture may
    /// refer to a row that a reload just removed.
    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) -> bool {
        if !self.tree.contains(id) {
            debug!(%id, expanded, "ignoring expand change for unknown folder");
            return false;
        }
        let next = self.tree.with_expanded(id, expanded);
        self.replace(next)
    }

    pub fn expand(&mut self, id: &NodeId) -> bool {
        self.set_expanded(id, true)
    }

    pub fn collapse(&mut self, id: &NodeId) -> bool {
        self.set_expanded(id, false)
    }

    /// Insert a confirmed folder as the last child of `parent_id`, expanding
    /// the parent unless it is the synthetic root.
    ///
    /// An unknown parent or an id that already exists means the tree and the
    /// folder service disagree; the commit is refused and the tree is left
    /// as it was.
    pub fn commit_new_node(&mut self, parent_id: &NodeId, node: TreeNode) -> Result<(), TreeError> {
        let id = node.id.clone();
        let next = self.tree.with_child(parent_id, node)?;
        info!(%id, parent = %parent_id, "folder committed");
        self.replace(next);
        Ok(())
    }

    fn replace(&mut self, next: Tree) -> bool {
        if Tree::ptr_eq(&self.tree, &next) {
            return false;
        }
        self.tree = next;
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, name: &str, children: &[&str], expanded: bool) -> TreeNode {
        TreeNode {
            id: NodeId::from(id),
            children: children.iter().map(|c| NodeId::from(*c)).collect(),
            expanded,
            name: name.to_string(),
        }
    }

    fn docs_tree() -> Tree {
        Tree::from_nodes(
            "r".into(),
            vec![folder("r", "", &["a"], false), folder("a", "Docs", &[], false)],
        )
        .unwrap()
    }

    fn loaded() -> TreeStore {
        let mut store = TreeStore::new();
        store.load(docs_tree());
        store
    }

    #[test]
    fn test_starts_root_only() {
        let store = TreeStore::new();
        assert!(store.tree().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_load_replaces_tree_and_discards_local_state() {
        let mut store = loaded();
        store.expand(&"a".into());
        assert!(store.tree().node(&"a".into()).unwrap().expanded);

        assert!(store.load(docs_tree()));
        assert!(!store.tree().node(&"a".into()).unwrap().expanded);
    }

    #[test]
    fn test_load_same_snapshot_is_idempotent() {
        let mut store = loaded();
        let before = store.snapshot();
        let revision = store.revision();

        assert!(!store.load(docs_tree()));
        assert!(Tree::ptr_eq(&before, store.tree()));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_expand_and_collapse() {
        let mut store = loaded();
        let before = store.snapshot();

        assert!(store.expand(&"a".into()));
        assert!(!Tree::ptr_eq(&before, store.tree()));
        assert!(store.tree().node(&"a".into()).unwrap().expanded);

        assert!(store.collapse(&"a".into()));
        assert!(!store.tree().node(&"a".into()).unwrap().expanded);
    }

    #[test]
    fn test_set_expanded_on_stale_id_is_noop() {
        let mut store = loaded();
        let before = store.snapshot();

        assert!(!store.set_expanded(&"gone".into(), true));
        assert!(Tree::ptr_eq(&before, store.tree()));
        assert_eq!(*store.tree(), before);
    }

    #[test]
    fn test_commit_appends_and_expands() {
        let mut store = loaded();
        store
            .commit_new_node(&"a".into(), TreeNode::new("b", "New"))
            .unwrap();
        store
            .commit_new_node(&"a".into(), TreeNode::new("c", "Newer"))
            .unwrap();

        let parent = store.tree().node(&"a".into()).unwrap();
        assert_eq!(parent.children, vec![NodeId::from("b"), NodeId::from("c")]);
        assert!(parent.expanded);
        assert!(store.tree().validate().is_ok());
    }

    #[test]
    fn test_commit_collision_leaves_tree_untouched() {
        let mut store = loaded();
        let before = store.snapshot();

        let err = store
            .commit_new_node(&"r".into(), TreeNode::new("a", "Clash"))
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId("a".into()));
        assert!(Tree::ptr_eq(&before, store.tree()));

        let err = store
            .commit_new_node(&"zz".into(), TreeNode::new("b", "Orphan"))
            .unwrap_err();
        assert_eq!(err, TreeError::UnknownParent("zz".into()));
        assert!(Tree::ptr_eq(&before, store.tree()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Expand(usize),
            Collapse(usize),
            /// Commit folder `n{id}` under the known node at `parent`.
            Commit { parent: usize, id: u8 },
            CommitUnderMissing(u8),
            Reload,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<usize>().prop_map(Op::Expand),
                any::<usize>().prop_map(Op::Collapse),
                (any::<usize>(), 0u8..16)
                    .prop_map(|(parent, id)| Op::Commit { parent, id }),
                (0u8..16).prop_map(Op::CommitUnderMissing),
                Just(Op::Reload),
            ]
        }

        fn initial_ids() -> Vec<NodeId> {
            vec!["r".into(), "a".into()]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                .. ProptestConfig::default()
            })]

            /// Any sequence of store operations keeps the tree valid, appends
            /// confirmed folders last and expands their non-root parent.
            #[test]
            fn test_every_reachable_tree_is_valid(
                ops in proptest::collection::vec(op(), 0..40),
            ) {
                let mut store = loaded();
                let mut known = initial_ids();

                for op in ops {
                    let before = store.snapshot();
                    match op {
                        Op::Expand(i) => {
                            let id = known[i % known.len()].clone();
                            store.expand(&id);
                            prop_assert!(store.tree().node(&id).unwrap().expanded);
                        }
                        Op::Collapse(i) => {
                            let id = known[i % known.len()].clone();
                            store.collapse(&id);
                            prop_assert!(!store.tree().node(&id).unwrap().expanded);
                        }
                        Op::Commit { parent, id } => {
                            let parent = known[parent % known.len()].clone();
                            let id = NodeId::from(format!("n{id}"));
                            let was_known = before.contains(&id);
                            let node = TreeNode::new(id.clone(), "new");
                            let result = store.commit_new_node(&parent, node);

                            if was_known {
                                prop_assert_eq!(result, Err(TreeError::DuplicateId(id)));
                                prop_assert!(Tree::ptr_eq(&before, store.tree()));
                            } else {
                                prop_assert!(result.is_ok());
                                let node = store.tree().node(&parent).unwrap();
                                prop_assert_eq!(node.children.last(), Some(&id));
                                if !store.tree().is_root(&parent) {
                                    prop_assert!(node.expanded);
                                }
                                prop_assert_eq!(store.tree().len(), before.len() + 1);
                                known.push(id);
                            }
                        }
                        Op::CommitUnderMissing(id) => {
                            let node = TreeNode::new(format!("m{id}"), "x");
                            let result = store.commit_new_node(&"missing".into(), node);
                            prop_assert!(result.is_err());
                            prop_assert!(Tree::ptr_eq(&before, store.tree()));
                        }
                        Op::Reload => {
                            store.load(docs_tree());
                            known = initial_ids();
                        }
                    }
                    prop_assert!(store.tree().validate().is_ok());
                }
            }
        }
    }
}
