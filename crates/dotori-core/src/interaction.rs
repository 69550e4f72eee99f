use crate::model::{NodeId, Tree};

/// A click on one part of a folder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Anywhere on the row that is not the label or the add button.
    RowClick(NodeId),
    LabelClick(NodeId),
    AddClick(NodeId),
}

/// What a gesture asks for. Each gesture yields exactly one intent, so a
/// click on the label or the add button never also toggles the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Expand(NodeId),
    Collapse(NodeId),
    Select(NodeId),
    CreateFolder(NodeId),
}

/// Map a gesture to its intent.
///
/// A row click collapses only an expanded row that has children; every
/// other row click expands, including a row with no children at all.
pub fn interpret(tree: &Tree, gesture: Gesture) -> Intent {
    match gesture {
        Gesture::RowClick(id) => {
            let open = tree
                .node(&id)
                .is_some_and(|node| node.has_children() && node.expanded);
            if open {
                Intent::Collapse(id)
            } else {
                Intent::Expand(id)
            }
        }
        Gesture::LabelClick(id) => Intent::Select(id),
        Gesture::AddClick(id) => Intent::CreateFolder(id),
    }
}

/// Receiver of interpreted gestures: the tree store for expand/collapse,
/// the selection owner for select, and the creation flow for new folders.
pub trait GestureTarget {
    fn expand(&mut self, id: &NodeId);
    fn collapse(&mut self, id: &NodeId);
    fn select_folder(&mut self, id: &NodeId);
    fn create_folder(&mut self, id: &NodeId);
}

/// Interpret `gesture` against `tree` and hand the single resulting intent
/// to `target`.
pub fn dispatch<T: GestureTarget + ?Sized>(
    tree: &Tree,
    gesture: Gesture,
    target: &mut T,
) -> Intent {
    let intent = interpret(tree, gesture);
    match &intent {
        Intent::Expand(id) => target.expand(id),
        Intent::Collapse(id) => target.collapse(id),
        Intent::Select(id) => target.select_folder(id),
        Intent::CreateFolder(id) => target.create_folder(id),
    }
    intent
}

/// Whether a row is drawn as the active one.
pub fn is_active(selected: Option<&NodeId>, id: &NodeId) -> bool {
    selected == Some(id)
}

// ── Row geometry ─────────────────────────────────────────────────────

/// Half-open column range `[start, end)` within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start: u16,
    pub end: u16,
}

impl ColumnSpan {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, column: u16) -> bool {
        self.start <= column && column < self.end
    }
}

/// Where the nested controls of a rendered row sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHit {
    pub label: ColumnSpan,
    /// Only present while the add button is shown.
    pub add_button: Option<ColumnSpan>,
}

impl RowHit {
    /// The gesture for a click at `column` on the row of `id`. The innermost
    /// control under the click wins and nothing bubbles up to the row.
    pub fn gesture_at(&self, id: &NodeId, column: u16) -> Gesture {
        if self.add_button.is_some_and(|span| span.contains(column)) {
            Gesture::AddClick(id.clone())
        } else if self.label.contains(column) {
            Gesture::LabelClick(id.clone())
        } else {
            Gesture::RowClick(id.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use crate::store::TreeStore;

    fn folder(id: &str, children: &[&str], expanded: bool) -> TreeNode {
        TreeNode {
            id: NodeId::from(id),
            children: children.iter().map(|c| NodeId::from(*c)).collect(),
            expanded,
            name: id.to_uppercase(),
        }
    }

    fn tree() -> Tree {
        Tree::from_nodes(
            "r".into(),
            vec![
                folder("r", &["a", "p", "q"], false),
                folder("a", &[], false),
                folder("p", &["c"], true),
                folder("q", &["d"], false),
                folder("c", &[], false),
                folder("d", &[], false),
            ],
        )
        .unwrap()
    }

    /// Records every call so tests can check only one thing happened.
    #[derive(Default)]
    struct Recorder {
        store: TreeStore,
        calls: Vec<String>,
        selected: Option<NodeId>,
    }

    impl GestureTarget for Recorder {
        fn expand(&mut self, id: &NodeId) {
            self.calls.push(format!("expand {id}"));
            self.store.expand(id);
        }
        fn collapse(&mut self, id: &NodeId) {
            self.calls.push(format!("collapse {id}"));
            self.store.collapse(id);
        }
        fn select_folder(&mut self, id: &NodeId) {
            self.calls.push(format!("select {id}"));
            self.selected = Some(id.clone());
        }
        fn create_folder(&mut self, id: &NodeId) {
            self.calls.push(format!("create {id}"));
        }
    }

    #[test]
    fn test_row_click_transitions() {
        let tree = tree();
        assert_eq!(
            interpret(&tree, Gesture::RowClick("p".into())),
            Intent::Collapse("p".into())
        );
        assert_eq!(
            interpret(&tree, Gesture::RowClick("q".into())),
            Intent::Expand("q".into())
        );
        // a childless row expands, even though there is nothing to reveal
        assert_eq!(
            interpret(&tree, Gesture::RowClick("a".into())),
            Intent::Expand("a".into())
        );
    }

    #[test]
    fn test_row_click_on_childless_row_sets_expanded() {
        let docs = Tree::from_nodes(
            "r".into(),
            vec![folder("r", &["a"], false), TreeNode::new("a", "Docs")],
        )
        .unwrap();
        let mut recorder = Recorder::default();
        recorder.store.load(docs.clone());

        dispatch(&docs, Gesture::RowClick("a".into()), &mut recorder);

        assert_eq!(recorder.calls, vec!["expand a"]);
        let a = recorder.store.tree().node(&"a".into()).unwrap();
        assert!(a.expanded);
        assert!(a.children.is_empty());
    }

    #[test]
    fn test_label_and_add_clicks_are_contained() {
        let tree = tree();
        let mut recorder = Recorder::default();
        recorder.store.load(tree.clone());

        dispatch(&tree, Gesture::LabelClick("q".into()), &mut recorder);
        assert_eq!(recorder.calls, vec!["select q"]);
        assert_eq!(recorder.selected, Some("q".into()));
        assert!(!recorder.store.tree().node(&"q".into()).unwrap().expanded);

        recorder.calls.clear();
        dispatch(&tree, Gesture::AddClick("p".into()), &mut recorder);
        assert_eq!(recorder.calls, vec!["create p"]);
        assert_eq!(recorder.selected, Some("q".into()));
        assert!(recorder.store.tree().node(&"p".into()).unwrap().expanded);
    }

    #[test]
    fn test_stale_row_click_is_harmless() {
        let tree = tree();
        let mut recorder = Recorder::default();
        recorder.store.load(tree.clone());
        let before = recorder.store.snapshot();

        dispatch(&tree, Gesture::RowClick("gone".into()), &mut recorder);
        assert!(Tree::ptr_eq(&before, recorder.store.tree()));
    }

    #[test]
    fn test_hit_testing_picks_innermost_control() {
        let hit = RowHit {
            label: ColumnSpan::new(4, 10),
            add_button: Some(ColumnSpan::new(17, 20)),
        };
        let id = NodeId::from("a");

        assert_eq!(hit.gesture_at(&id, 0), Gesture::RowClick(id.clone()));
        assert_eq!(hit.gesture_at(&id, 4), Gesture::LabelClick(id.clone()));
        assert_eq!(hit.gesture_at(&id, 9), Gesture::LabelClick(id.clone()));
        assert_eq!(hit.gesture_at(&id, 10), Gesture::RowClick(id.clone()));
        assert_eq!(hit.gesture_at(&id, 18), Gesture::AddClick(id.clone()));

        let hidden = RowHit {
            add_button: None,
            ..hit
        };
        assert_eq!(hidden.gesture_at(&id, 18), Gesture::RowClick(id.clone()));
    }

    #[test]
    fn test_is_active() {
        let a = NodeId::from("a");
        assert!(is_active(Some(&a), &a));
        assert!(!is_active(None, &a));
        assert!(!is_active(Some(&NodeId::from("b")), &a));
    }
}
