//! Application module
//!
//! Owns the wizard, the install runner and the UI-only state, and turns key
//! presses into wizard operations.
//!
//! # Module Structure
//! - `state` - UI state types (AppState, AppMode, LogView, EditBuffer)
//! - Main module - App struct and event loop

mod state;

pub use state::{AppMode, AppState, EditBuffer, LogView};

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::Backend};
use tracing::{debug, info, warn};

use crate::components::keybindings::{KeyAction, KeybindingContext};
use crate::devices::{self, DeviceCatalog};
use crate::error::{Result, WizardError};
use crate::install::{InstallRunner, InstallSession};
use crate::process_guard::ProcessGuard;
use crate::settings::Settings;
use crate::theme::UiText;
use crate::ui::UiRenderer;
use crate::wizard::{Field, FieldEdit, FieldKind, NavigationError, PageKind, Transition, Wizard};

/// Lines moved by PageUp/PageDown in the log view
const LOG_PAGE: usize = 10;

/// Main application struct
pub struct App {
    wizard: Wizard,
    runner: InstallRunner,
    session: Option<InstallSession>,
    state: AppState,
    keybinding_context: KeybindingContext,
    ui_renderer: UiRenderer,
    partition_editor: Vec<String>,
    /// Armed while the installer runs; terminates it if the app goes away
    process_guard: Option<ProcessGuard>,
    /// Pending device scan, delivered through `tick`
    device_scan: Option<Receiver<DeviceCatalog>>,
}

impl App {
    /// Create a new application instance
    pub fn new(settings: &Settings, catalog: DeviceCatalog) -> Self {
        info!(
            "Creating App with {} disk(s) and {} partition(s)",
            catalog.disks.len(),
            catalog.partitions.len()
        );
        Self {
            wizard: Wizard::new(catalog),
            runner: InstallRunner::new(settings.runner_settings()),
            session: None,
            state: AppState::default(),
            keybinding_context: KeybindingContext::new(),
            ui_renderer: UiRenderer::new(),
            partition_editor: settings.partition_editor.clone(),
            process_guard: None,
            device_scan: None,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn keybinding_context(&self) -> &KeybindingContext {
        &self.keybinding_context
    }

    /// Install result once the installer has finished
    pub fn install_succeeded(&self) -> Option<bool> {
        self.session
            .as_ref()
            .and_then(|s| s.outcome())
            .map(|o| o.is_success())
    }

    /// Field under the cursor on the current page
    pub fn focused_field(&self) -> Option<Field> {
        self.visible_fields().get(self.state.focus).copied()
    }

    /// Fields of the current page as they are shown right now
    pub fn visible_fields(&self) -> Vec<Field> {
        self.wizard.current().visible_fields(self.wizard.config())
    }

    /// Replace the detected devices
    pub fn refresh_devices(&mut self, catalog: DeviceCatalog) {
        let count = catalog.disks.len() + catalog.partitions.len();
        self.wizard.set_catalog(catalog);
        self.state.status_message = format!("Device list refreshed ({count} entries)");
    }

    /// Run `detect` on a helper thread; the result is applied by `tick`.
    ///
    /// A second request while one is pending is ignored.
    pub fn scan_devices<F>(&mut self, detect: F)
    where
        F: FnOnce() -> DeviceCatalog + Send + 'static,
    {
        if self.device_scan.is_some() {
            debug!("Device scan already running");
            return;
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may be gone if the app quit meanwhile
            let _ = tx.send(detect());
        });
        self.device_scan = Some(rx);
        self.state.status_message = "Scanning devices...".to_string();
    }

    /// Whether a device scan is still pending
    pub fn is_scanning(&self) -> bool {
        self.device_scan.is_some()
    }

    fn poll_device_scan(&mut self) {
        let Some(rx) = self.device_scan.as_ref() else {
            return;
        };
        match rx.try_recv() {
            Ok(catalog) => {
                self.device_scan = None;
                self.refresh_devices(catalog);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                warn!("Device scan thread ended without a result");
                self.device_scan = None;
            }
        }
    }

    /// Run the main application loop until the operator quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Starting main application loop");

        loop {
            self.tick(Instant::now());

            terminal
                .draw(|f| self.ui_renderer.render(f, self))
                .map_err(|e| WizardError::terminal(format!("draw failed: {e}")))?;

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if self.handle_key(key) {
                        info!("Quit requested");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Drive the install log and pending device scans; call once per loop
    /// iteration.
    pub fn tick(&mut self, now: Instant) {
        self.poll_device_scan();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(update) = session.tick(now) {
            self.state.log.replace(update.text);
        }
        if self.state.mode == AppMode::Installing {
            if let Some(outcome) = session.outcome() {
                info!("Install finished, success = {}", outcome.is_success());
                self.state.status_message = outcome.status_line();
                self.state.mode = AppMode::Finished;
                if let Some(guard) = self.process_guard.as_mut() {
                    guard.disarm();
                }
            }
        }
    }

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        if self.state.popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.popup = None;
            }
            return false;
        }

        if self.state.help_visible {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_visible = false;
            }
            return false;
        }

        let mode = self.state.mode;
        let action = self.keybinding_context.action_for(mode, &key);
        match mode {
            AppMode::Form => self.handle_form(action),
            AppMode::Editing => self.handle_editing(action, key),
            AppMode::Installing | AppMode::Finished => self.handle_log(action),
        }
    }

    fn handle_form(&mut self, action: Option<KeyAction>) -> bool {
        let Some(action) = action else {
            return false;
        };
        match action {
            KeyAction::FocusUp => {
                self.state.focus = self.state.focus.saturating_sub(1);
            }
            KeyAction::FocusDown => {
                let len = self.visible_fields().len();
                if self.state.focus + 1 < len {
                    self.state.focus += 1;
                }
            }
            KeyAction::Activate => self.activate_focused(),
            KeyAction::CyclePrev => self.cycle_focused(false),
            KeyAction::CycleNext => self.cycle_focused(true),
            KeyAction::Next => self.go_next(),
            KeyAction::Back => match self.wizard.retreat() {
                Ok(page) => {
                    self.state.focus = 0;
                    self.state.status_message = page.title().to_string();
                }
                Err(e) => debug!("Back refused: {}", e),
            },
            KeyAction::PartitionEditor => self.open_partition_editor(),
            KeyAction::RefreshDevices => {
                if self.wizard.current() == PageKind::Storage {
                    self.scan_devices(DeviceCatalog::detect);
                }
            }
            KeyAction::Help => self.state.help_visible = true,
            KeyAction::Quit => return true,
            _ => {}
        }
        false
    }

    fn handle_editing(&mut self, action: Option<KeyAction>, key: KeyEvent) -> bool {
        match action {
            Some(KeyAction::Commit) => {
                if let Some(edit) = self.state.edit.take() {
                    self.apply(edit.field, FieldEdit::Text(edit.value));
                }
                self.state.mode = AppMode::Form;
            }
            Some(KeyAction::Cancel) => {
                self.state.edit = None;
                self.state.mode = AppMode::Form;
            }
            Some(KeyAction::DeleteChar) => {
                if let Some(edit) = self.state.edit.as_mut() {
                    edit.value.pop();
                }
            }
            Some(KeyAction::Quit) => return true,
            _ => {
                if let KeyCode::Char(c) = key.code {
                    if !key.modifiers.contains(KeyModifiers::CONTROL) {
                        if let Some(edit) = self.state.edit.as_mut() {
                            edit.value.push(c);
                        }
                    }
                }
            }
        }
        false
    }

    fn handle_log(&mut self, action: Option<KeyAction>) -> bool {
        let log = &mut self.state.log;
        match action {
            Some(KeyAction::ScrollUp) => log.scroll_up(1),
            Some(KeyAction::ScrollDown) => log.scroll_down(1),
            Some(KeyAction::PageUp) => log.scroll_up(LOG_PAGE),
            Some(KeyAction::PageDown) => log.scroll_down(LOG_PAGE),
            Some(KeyAction::Follow) => log.follow(),
            Some(KeyAction::Help) => self.state.help_visible = true,
            Some(KeyAction::Quit) if self.state.mode == AppMode::Finished => return true,
            Some(KeyAction::Quit) => {
                warn!("Quit refused while the installer runs");
                self.state.status_message = UiText::QUIT_BLOCKED.to_string();
            }
            _ => {}
        }
        false
    }

    fn activate_focused(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Text | FieldKind::Secret => {
                let value = field
                    .text(self.wizard.config())
                    .unwrap_or_default()
                    .to_string();
                self.state.edit = Some(EditBuffer { field, value });
                self.state.mode = AppMode::Editing;
            }
            FieldKind::Toggle => self.apply(field, FieldEdit::Toggle),
            FieldKind::Choice | FieldKind::Device(_) => {
                self.apply(field, FieldEdit::Cycle { forward: true })
            }
        }
    }

    fn cycle_focused(&mut self, forward: bool) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Toggle => self.apply(field, FieldEdit::Toggle),
            FieldKind::Choice | FieldKind::Device(_) => {
                self.apply(field, FieldEdit::Cycle { forward })
            }
            FieldKind::Text | FieldKind::Secret => {}
        }
    }

    fn apply(&mut self, field: Field, edit: FieldEdit) {
        if let Err(e) = self.wizard.apply(field, edit) {
            warn!("Edit of {:?} refused: {}", field, e);
            self.state.status_message = e.to_string();
        }
        // Toggling the partition mode or encryption changes the row count
        let len = self.visible_fields().len();
        self.state.focus = self.state.focus.min(len.saturating_sub(1));
    }

    fn go_next(&mut self) {
        match self.wizard.advance() {
            Ok(Transition::Moved(page)) => {
                self.state.focus = 0;
                self.state.status_message = page.title().to_string();
            }
            Ok(Transition::EnteredTerminal) => self.start_install(),
            Err(NavigationError::Validation(err)) => {
                let message = self
                    .wizard
                    .take_error()
                    .unwrap_or_else(|| err.reason().to_string());
                self.state.popup = Some(message);
            }
            Err(e) => debug!("Next refused: {}", e),
        }
    }

    fn start_install(&mut self) {
        let config = self.wizard.config().clone();
        match self.runner.start(&config, &mut self.wizard) {
            Ok(session) => {
                self.session = Some(session);
                self.process_guard = Some(ProcessGuard::new());
                self.state.focus = 0;
                self.state.log = LogView::default();
                self.state.mode = AppMode::Installing;
                self.state.status_message = "Installing Arch Linux...".to_string();
            }
            Err(e) => {
                let message = self.wizard.take_error().unwrap_or_else(|| e.to_string());
                self.state.popup = Some(message);
                self.state.status_message = e.to_string();
                self.state.mode = AppMode::Finished;
            }
        }
    }

    fn open_partition_editor(&mut self) {
        if self.wizard.current() != PageKind::Storage {
            return;
        }
        match devices::launch_partition_editor(&self.partition_editor) {
            Ok(()) => {
                self.state.status_message =
                    "Partition editor opened, press r to refresh devices when done".to_string();
            }
            Err(e) => {
                warn!("Partition editor failed: {:#}", e);
                self.state.popup = Some(format!("{e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let catalog = DeviceCatalog {
            disks: vec!["/dev/sda (20G)".to_string()],
            partitions: vec!["/dev/sda1 (512M)".to_string()],
        };
        App::new(&Settings::default(), catalog)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_next_moves_to_storage() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.wizard().current(), PageKind::Storage);
        assert_eq!(app.focused_field(), Some(Field::PartitionMode));
    }

    #[test]
    fn test_editing_commits_text() {
        let mut app = app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('n'));
        }
        assert_eq!(app.wizard().current(), PageKind::Account);
        assert_eq!(app.focused_field(), Some(Field::Hostname));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::Editing);
        for _ in 0.."archlinux".len() {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "box".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state().mode, AppMode::Form);
        assert_eq!(app.wizard().config().hostname, "box");
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('n'));
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.wizard().config().hostname, "archlinux");
    }

    #[test]
    fn test_quit_from_form() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
