use crate::model::{NodeId, Tree};

// ── VisibleRow ───────────────────────────────────────────────────────

/// One visible line of the folder tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub expanded: bool,
    pub has_children: bool,
    /// For each depth level 0..depth, whether a vertical guide line (│) should
    /// be drawn. True when the ancestor at that depth has more siblings below.
    pub guide_depths: Vec<bool>,
}

/// Flatten the rows a viewer would see: the root's children at depth 0,
/// and the children of every expanded node below it. The synthetic root
/// itself is never a row.
pub fn visible_rows(tree: &Tree) -> Vec<VisibleRow> {
    let mut out = Vec::new();
    if let Some(root) = tree.root() {
        flatten(tree, &root.children, 0, &[], &mut out);
    }
    out
}

fn flatten(
    tree: &Tree,
    ids: &[NodeId],
    depth: usize,
    parent_guides: &[bool],
    out: &mut Vec<VisibleRow>,
) {
    for (i, id) in ids.iter().enumerate() {
        let Some(node) = tree.node(id) else {
            continue;
        };

        out.push(VisibleRow {
            id: node.id.clone(),
            depth,
            name: node.name.clone(),
            expanded: node.expanded,
            has_children: node.has_children(),
            guide_depths: parent_guides.to_vec(),
        });

        if node.expanded && node.has_children() {
            let mut child_guides = parent_guides.to_vec();
            child_guides.push(i + 1 < ids.len());
            flatten(tree, &node.children, depth + 1, &child_guides, out);
        }
    }
}

// ── Rendering hook ───────────────────────────────────────────────────

/// What the folder tree hands to whatever draws it.
///
/// The drawing side owns layout, indentation and gesture capture. It calls
/// `render_item` for each visible row and reports its own expand/collapse
/// gestures (chevrons, arrow keys) back through `on_expand`/`on_collapse`.
pub trait TreeItemHandler {
    type Item;

    fn render_item(&self, row: &VisibleRow) -> Self::Item;
    fn on_expand(&mut self, id: &NodeId);
    fn on_collapse(&mut self, id: &NodeId);
}

/// Render `rows`, as produced by `visible_rows`, through `handler` in
/// display order.
pub fn render_items<H: TreeItemHandler + ?Sized>(
    rows: &[VisibleRow],
    handler: &H,
) -> Vec<H::Item> {
    rows.iter()
        .map(|row| handler.render_item(row))
        .collect()
}
