pub mod client;
pub mod executor;
pub mod ui;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use dotori_core::interaction::{self, Gesture, GestureTarget};
use dotori_core::render::{self, TreeItemHandler, VisibleRow};
use dotori_core::{Creation, CreationFlow, ErrorReporter, NodeId, Tree, TreeStore};
use ratatui::{Frame, layout::Rect};
use tracing::{debug, warn};

use executor::{FolderCmd, FolderExecutor, FolderResult};

/// What the hub should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
}

/// One row as handed to the view: the tree row plus how to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRow {
    pub row: VisibleRow,
    /// The selected folder.
    pub active: bool,
    /// Under the cursor.
    pub hovered: bool,
}

impl FolderRow {
    /// The add button shows on the hovered and the active row.
    pub fn shows_add_button(&self) -> bool {
        self.active || self.hovered
    }
}

/// The folder list: owns the tree store, the selection and the cursor, and
/// talks to the folder service through a background executor.
pub struct FolderTool<R: ErrorReporter = dotori_core::TracingReporter> {
    store: TreeStore,
    flow: CreationFlow<R>,
    executor: FolderExecutor,
    /// Owned here, changed only through `select_folder`.
    selected_folder_id: Option<NodeId>,
    /// Visible rows as of `rows_revision`.
    rows: Vec<VisibleRow>,
    rows_revision: u64,
    /// Index into `rows`.
    cursor: usize,
    /// Columns of indentation per tree level.
    indent: u16,
    loading: bool,
    pending_creations: usize,
    last_error: Option<String>,
}

impl<R: ErrorReporter> FolderTool<R> {
    /// Create the tool and request the initial tree.
    pub fn new(executor: FolderExecutor, flow: CreationFlow<R>, indent: u16) -> Self {
        let mut tool = Self {
            store: TreeStore::new(),
            flow,
            executor,
            selected_folder_id: None,
            rows: Vec::new(),
            rows_revision: 0,
            cursor: 0,
            indent,
            loading: false,
            pending_creations: 0,
            last_error: None,
        };
        tool.reload();
        tool
    }

    pub fn tree(&self) -> &Tree {
        self.store.tree()
    }

    pub fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn indent(&self) -> u16 {
        self.indent
    }

    pub fn selected_folder_id(&self) -> Option<&NodeId> {
        self.selected_folder_id.as_ref()
    }

    pub fn selected_folder_name(&self) -> Option<&str> {
        self.selected_folder_id
            .as_ref()
            .and_then(|id| self.store.tree().node(id))
            .map(|node| node.name.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_creations(&self) -> usize {
        self.pending_creations
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The row under the cursor.
    pub fn hovered_row(&self) -> Option<&VisibleRow> {
        self.rows.get(self.cursor)
    }

    /// Ask the folder service for a fresh tree.
    pub fn reload(&mut self) {
        match self.executor.send(FolderCmd::FetchTree) {
            Ok(()) => self.loading = true,
            Err(_) => self.last_error = Some("folder service is not running".to_string()),
        }
    }

    /// Feed a gesture through the interaction policy.
    pub fn apply(&mut self, gesture: Gesture) {
        let tree = self.store.snapshot();
        let intent = interaction::dispatch(&tree, gesture, self);
        debug!(?intent, "gesture applied");
        self.refresh_rows();
    }

    /// Drain finished executor work into the store.
    pub fn tick(&mut self) {
        while let Some(result) = self.executor.try_recv() {
            match result {
                FolderResult::TreeFetched(Ok(tree)) => {
                    self.loading = false;
                    self.store.load(tree);
                }
                FolderResult::TreeFetched(Err(e)) => {
                    self.loading = false;
                    warn!(error = %e, "could not fetch folder tree");
                    self.last_error = Some(e.to_string());
                }
                FolderResult::FolderCreated { request, outcome } => {
                    self.pending_creations = self.pending_creations.saturating_sub(1);
                    match self.flow.complete(&mut self.store, &request, outcome) {
                        Creation::Committed(_) | Creation::Abandoned => {}
                        Creation::Failed(e) => self.last_error = Some(e.to_string()),
                    }
                }
            }
        }
        self.refresh_rows();
    }

    /// Rebuild the visible rows after the tree changed, keeping the cursor on
    /// the same folder when it is still visible.
    fn refresh_rows(&mut self) {
        if self.store.revision() == self.rows_revision {
            return;
        }
        let hovered = self.hovered_row().map(|row| row.id.clone());
        self.rows = render::visible_rows(self.store.tree());
        self.rows_revision = self.store.revision();

        if let Some(id) = hovered {
            if let Some(pos) = self.rows.iter().position(|row| row.id == id) {
                self.cursor = pos;
                return;
            }
        }
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    fn hovered_id(&self) -> Option<NodeId> {
        self.hovered_row().map(|row| row.id.clone())
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Collapse the hovered folder, or move to its parent if it is already
    /// collapsed or has no children.
    pub fn collapse_or_parent(&mut self) {
        let Some(row) = self.hovered_row() else {
            return;
        };
        if row.expanded && row.has_children {
            let id = row.id.clone();
            self.on_collapse(&id);
            return;
        }

        let tree = self.store.tree();
        let parent = tree
            .parent_of(&row.id)
            .filter(|parent| !tree.is_root(parent));
        let position = parent.and_then(|parent| self.rows.iter().position(|r| r.id == *parent));
        if let Some(pos) = position {
            self.cursor = pos;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor = self.rows.len().saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.hovered_id() {
                    self.apply(Gesture::RowClick(id));
                }
            }
            KeyCode::Char('s') => {
                if let Some(id) = self.hovered_id() {
                    self.apply(Gesture::LabelClick(id));
                }
            }
            KeyCode::Char('a') => {
                if let Some(id) = self.hovered_id() {
                    self.apply(Gesture::AddClick(id));
                }
            }
            KeyCode::Char('A') => {
                let root = self.store.tree().root_id().clone();
                GestureTarget::create_folder(self, &root);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(id) = self.hovered_id() {
                    self.on_expand(&id);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.collapse_or_parent(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        Action::None
    }

    /// Handle a mouse event inside `area`, the space the tool renders into.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let inner = ui::list_area(area);
                if mouse.row < inner.y
                    || mouse.row >= inner.y + inner.height
                    || mouse.column < inner.x
                    || mouse.column >= inner.x + inner.width
                {
                    return Action::None;
                }

                let offset = ui::scroll_offset(self.cursor, inner.height as usize);
                let index = offset + (mouse.row - inner.y) as usize;
                let Some(row) = self.rows.get(index) else {
                    return Action::None;
                };

                let folder_row = self.render_item(row);
                let hit = ui::row_hit(&folder_row, self.indent, inner.width);
                let gesture = hit.gesture_at(&row.id, mouse.column - inner.x);

                self.cursor = index;
                self.apply(gesture);
            }
            MouseEventKind::ScrollDown => self.move_down(),
            MouseEventKind::ScrollUp => self.move_up(),
            _ => {}
        }
        Action::None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        ui::render_folder_tool(frame, area, self);
    }
}

impl<R: ErrorReporter> GestureTarget for FolderTool<R> {
    fn expand(&mut self, id: &NodeId) {
        self.store.expand(id);
    }

    fn collapse(&mut self, id: &NodeId) {
        self.store.collapse(id);
    }

    fn select_folder(&mut self, id: &NodeId) {
        self.selected_folder_id = Some(id.clone());
    }

    fn create_folder(&mut self, id: &NodeId) {
        let request = match self.flow.request_for(self.store.tree(), id) {
            Ok(request) => request,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };
        match self.executor.send(FolderCmd::CreateFolder(request)) {
            Ok(()) => self.pending_creations += 1,
            Err(_) => self.last_error = Some("folder service is not running".to_string()),
        }
    }
}

impl<R: ErrorReporter> TreeItemHandler for FolderTool<R> {
    type Item = FolderRow;

    fn render_item(&self, row: &VisibleRow) -> FolderRow {
        FolderRow {
            row: row.clone(),
            active: interaction::is_active(self.selected_folder_id.as_ref(), &row.id),
            hovered: self.hovered_row().is_some_and(|hovered| hovered.id == row.id),
        }
    }

    fn on_expand(&mut self, id: &NodeId) {
        self.store.expand(id);
        self.refresh_rows();
    }

    fn on_collapse(&mut self, id: &NodeId) {
        self.store.collapse(id);
        self.refresh_rows();
    }
}
