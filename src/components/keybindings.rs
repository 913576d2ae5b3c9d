//! Keybinding system for context-aware keyboard shortcuts
//!
//! Provides a registry of keybindings that change with the application mode.
//! The same registry drives key dispatch, the nav bar hints and the help
//! overlay, so what is shown is always what works.

use crate::app::AppMode;
use crate::wizard::PageKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    FocusUp,
    FocusDown,
    /// Edit a text field, flip a toggle or step a choice
    Activate,
    CyclePrev,
    CycleNext,
    Next,
    Back,
    PartitionEditor,
    RefreshDevices,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Follow,
    Commit,
    Cancel,
    DeleteChar,
    Help,
    Quit,
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        // Shift is implied by uppercase characters and ignored
        let mods = event.modifiers.difference(KeyModifiers::SHIFT);
        self.key == event.code && self.modifiers == mods
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    mode_bindings: HashMap<AppMode, Vec<Keybinding>>,
    /// Ctrl+C, available in every mode
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            mode_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    fn register_defaults(&mut self) {
        self.global_bindings = vec![Keybinding::with_modifiers(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyAction::Quit,
            "Ctrl+C",
            "Quit",
        )];

        self.mode_bindings.insert(
            AppMode::Form,
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::FocusUp, "Up", "Previous field"),
                Keybinding::new(KeyCode::Down, KeyAction::FocusDown, "Down", "Next field"),
                Keybinding::new(KeyCode::Enter, KeyAction::Activate, "Enter", "Edit / toggle"),
                Keybinding::new(KeyCode::Char(' '), KeyAction::Activate, "Space", "Edit / toggle"),
                Keybinding::new(KeyCode::Left, KeyAction::CyclePrev, "Left", "Previous option"),
                Keybinding::new(KeyCode::Right, KeyAction::CycleNext, "Right", "Next option"),
                Keybinding::new(KeyCode::Char('n'), KeyAction::Next, "N", "Next step"),
                Keybinding::new(KeyCode::Char('b'), KeyAction::Back, "B", "Back"),
                Keybinding::new(
                    KeyCode::Char('p'),
                    KeyAction::PartitionEditor,
                    "P",
                    "Open partition editor",
                ),
                Keybinding::new(
                    KeyCode::Char('r'),
                    KeyAction::RefreshDevices,
                    "R",
                    "Refresh devices",
                ),
                Keybinding::new(KeyCode::Char('?'), KeyAction::Help, "?", "Help"),
                Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"),
            ],
        );

        self.mode_bindings.insert(
            AppMode::Editing,
            vec![
                Keybinding::new(KeyCode::Enter, KeyAction::Commit, "Enter", "Save value"),
                Keybinding::new(KeyCode::Esc, KeyAction::Cancel, "Esc", "Discard changes"),
                Keybinding::new(KeyCode::Backspace, KeyAction::DeleteChar, "Bksp", "Delete"),
            ],
        );

        let log_bindings = vec![
            Keybinding::new(KeyCode::Up, KeyAction::ScrollUp, "Up", "Scroll up"),
            Keybinding::new(KeyCode::Down, KeyAction::ScrollDown, "Down", "Scroll down"),
            Keybinding::new(KeyCode::PageUp, KeyAction::PageUp, "PgUp", "Page up"),
            Keybinding::new(KeyCode::PageDown, KeyAction::PageDown, "PgDn", "Page down"),
            Keybinding::new(KeyCode::End, KeyAction::Follow, "End", "Follow output"),
            Keybinding::new(KeyCode::Char('?'), KeyAction::Help, "?", "Help"),
        ];

        let mut installing = log_bindings.clone();
        // Listed so the refusal can be explained; the app ignores it
        installing.push(Keybinding::new(
            KeyCode::Char('q'),
            KeyAction::Quit,
            "Q",
            "Quit (disabled while installing)",
        ));
        self.mode_bindings.insert(AppMode::Installing, installing);

        let mut finished = log_bindings;
        finished.push(Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"));
        self.mode_bindings.insert(AppMode::Finished, finished);
    }

    /// Get keybindings for a mode, global ones last
    pub fn get_bindings(&self, mode: AppMode) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = Vec::new();
        if let Some(mode_bindings) = self.mode_bindings.get(&mode) {
            bindings.extend(mode_bindings.iter());
        }
        bindings.extend(self.global_bindings.iter());
        bindings
    }

    /// Resolve a key press to an action in `mode`
    pub fn action_for(&self, mode: AppMode, event: &KeyEvent) -> Option<KeyAction> {
        self.get_bindings(mode)
            .into_iter()
            .find(|b| b.matches(event))
            .map(|b| b.action)
    }

    /// Get navigation bar items for display
    pub fn get_nav_items(&self, mode: AppMode, page: PageKind) -> Vec<NavBarItem> {
        let priority_actions: Vec<KeyAction> = match mode {
            AppMode::Form if page == PageKind::Storage => vec![
                KeyAction::FocusDown,
                KeyAction::Activate,
                KeyAction::CycleNext,
                KeyAction::PartitionEditor,
                KeyAction::RefreshDevices,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            AppMode::Form => vec![
                KeyAction::FocusDown,
                KeyAction::Activate,
                KeyAction::CycleNext,
                KeyAction::Help,
                KeyAction::Quit,
            ],
            AppMode::Editing => vec![KeyAction::Commit, KeyAction::Cancel],
            AppMode::Installing => vec![KeyAction::ScrollUp, KeyAction::Follow, KeyAction::Help],
            AppMode::Finished => vec![KeyAction::ScrollUp, KeyAction::Follow, KeyAction::Quit],
        };

        let bindings = self.get_bindings(mode);
        priority_actions
            .into_iter()
            .filter_map(|action| bindings.iter().find(|b| b.action == action))
            .map(|b| NavBarItem {
                key_display: b.display.clone(),
                action_label: b.description.clone(),
            })
            .collect()
    }

    /// Get full help content for a mode (for help overlay)
    pub fn get_help_content(&self, mode: AppMode) -> Vec<HelpSection> {
        let groups: [(&str, &[KeyAction]); 3] = [
            (
                "Navigation",
                &[
                    KeyAction::FocusUp,
                    KeyAction::FocusDown,
                    KeyAction::ScrollUp,
                    KeyAction::ScrollDown,
                    KeyAction::PageUp,
                    KeyAction::PageDown,
                    KeyAction::Follow,
                ],
            ),
            (
                "Editing",
                &[
                    KeyAction::Activate,
                    KeyAction::CyclePrev,
                    KeyAction::CycleNext,
                    KeyAction::Commit,
                    KeyAction::Cancel,
                    KeyAction::DeleteChar,
                    KeyAction::PartitionEditor,
                    KeyAction::RefreshDevices,
                ],
            ),
            (
                "General",
                &[KeyAction::Next, KeyAction::Back, KeyAction::Help, KeyAction::Quit],
            ),
        ];

        let bindings = self.get_bindings(mode);
        groups
            .into_iter()
            .filter_map(|(title, actions)| {
                let items: Vec<(String, String)> = bindings
                    .iter()
                    .filter(|b| actions.contains(&b.action))
                    .map(|b| (b.display.clone(), b.description.clone()))
                    .collect();
                (!items.is_empty()).then(|| HelpSection {
                    title: title.to_string(),
                    items,
                })
            })
            .collect()
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

/// Help section for the help overlay
#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: String,
    pub items: Vec<(String, String)>,
}
