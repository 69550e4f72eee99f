use crossterm::event::Event;
use dotori_core::CreationFlow;
use dotori_folders::client::HttpFolderClient;
use dotori_folders::executor::FolderExecutor;
use dotori_folders::{Action, FolderTool};
use ratatui::{Frame, layout::Rect};

use crate::config::Config;

/// The main application state.
pub struct App {
    folders: FolderTool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Last area the folder list was drawn into, for mouse hit testing.
    area: Rect,
}

impl App {
    /// Wire the folder list to the configured folder service.
    pub fn new(config: &Config) -> Self {
        let executor = FolderExecutor::spawn(HttpFolderClient::new(config.api_url.clone()));
        let flow = CreationFlow::new().with_default_name(config.default_folder_name.clone());
        Self::with_tool(FolderTool::new(executor, flow, config.indent_per_level))
    }

    pub fn with_tool(folders: FolderTool) -> Self {
        Self {
            folders,
            should_quit: false,
            area: Rect::default(),
        }
    }

    /// Tick the folder list (called every ~50ms to drain executor results).
    pub fn tick(&mut self) {
        self.folders.tick();
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        let action = match event {
            Event::Key(key) => self.folders.handle_key(key),
            Event::Mouse(mouse) => self.folders.handle_mouse(mouse, self.area),
            _ => Action::None,
        };
        if action == Action::Quit {
            self.should_quit = true;
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.area = frame.area();
        self.folders.render(frame, self.area);
    }
}
