//! Application state definitions
//!
//! UI-only state: which form row has focus, the text being edited, the
//! install log view and overlays. Everything the installer needs lives in
//! the `Wizard`.

use crate::wizard::Field;

/// Input handling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Moving between fields and pages
    Form,
    /// Typing into a text or secret field
    Editing,
    /// Installer running; the wizard is locked and quitting is refused
    Installing,
    /// Installer finished (either way)
    Finished,
}

/// Text being typed into a field before it is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub field: Field,
    pub value: String,
}

/// Install log as shown on screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogView {
    text: String,
    line_count: usize,
    /// Lines scrolled up from the bottom; 0 follows new output
    offset_from_bottom: usize,
}

impl LogView {
    /// Replace the whole text, as delivered by a flush cycle
    pub fn replace(&mut self, text: String) {
        self.line_count = text.lines().count();
        self.text = text;
        self.offset_from_bottom = self.offset_from_bottom.min(self.line_count);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_following(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset_from_bottom = (self.offset_from_bottom + lines).min(self.line_count);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(lines);
    }

    /// Jump back to the newest output
    pub fn follow(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// First line to draw in a viewport `height` lines tall
    pub fn top_line(&self, height: usize) -> usize {
        self.line_count
            .saturating_sub(height)
            .saturating_sub(self.offset_from_bottom)
    }
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub mode: AppMode,
    /// Index into the current page's visible fields
    pub focus: usize,
    pub edit: Option<EditBuffer>,
    pub log: LogView,
    /// Blocking error popup
    pub popup: Option<String>,
    pub help_visible: bool,
    /// One-line feedback under the nav bar
    pub status_message: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Form,
            focus: 0,
            edit: None,
            log: LogView::default(),
            popup: None,
            help_visible: false,
            status_message: "Welcome to the Arch Linux installer".to_string(),
        }
    }
}
