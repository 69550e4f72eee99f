use std::cell::RefCell;
use std::future::Future;
use std::rc::Weak;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::Tree;
use crate::store::TreeStore;

/// Source of the initial folder tree.
pub trait FolderQuery {
    fn fetch_folder_tree(&self) -> impl Future<Output = Result<Tree, FetchError>>;
}

/// Fetch the tree once and load it into the store.
///
/// A failed fetch leaves the store as it was (the root-only tree on mount);
/// nothing is retried. If the store is gone by the time the fetch resolves
/// the result is dropped.
pub async fn load_initial<Q: FolderQuery>(query: &Q, store: &Weak<RefCell<TreeStore>>) -> bool {
    let fetched = query.fetch_folder_tree().await;

    let Some(store) = store.upgrade() else {
        debug!("folder tree fetched after the store was dropped");
        return false;
    };

    match fetched {
        Ok(tree) => store.borrow_mut().load(tree),
        Err(e) => {
            warn!(error = %e, "could not fetch folder tree");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::error::ApiError;
    use crate::model::{NodeId, TreeNode};

    struct Fixed(Result<Tree, FetchError>);

    impl FolderQuery for Fixed {
        async fn fetch_folder_tree(&self) -> Result<Tree, FetchError> {
            self.0.clone()
        }
    }

    fn docs_tree() -> Tree {
        let mut root = TreeNode::new("r", "");
        root.children.push(NodeId::from("a"));
        Tree::from_nodes("r".into(), vec![root, TreeNode::new("a", "Docs")]).unwrap()
    }

    #[tokio::test]
    async fn test_load_initial_fills_store() {
        let store = Rc::new(RefCell::new(TreeStore::new()));
        let loaded = load_initial(&Fixed(Ok(docs_tree())), &Rc::downgrade(&store)).await;

        assert!(loaded);
        assert_eq!(*store.borrow().tree(), docs_tree());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_empty_tree() {
        let store = Rc::new(RefCell::new(TreeStore::new()));
        let failing = Fixed(Err(ApiError::Network("connection refused".into()).into()));

        assert!(!load_initial(&failing, &Rc::downgrade(&store)).await);
        assert!(store.borrow().tree().is_empty());
        assert_eq!(store.borrow().revision(), 0);
    }

    #[tokio::test]
    async fn test_dropped_store_ignores_result() {
        let store = Rc::new(RefCell::new(TreeStore::new()));
        let weak = Rc::downgrade(&store);
        drop(store);

        assert!(!load_initial(&Fixed(Ok(docs_tree())), &weak).await);
    }
}
