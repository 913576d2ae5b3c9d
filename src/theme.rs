//! Centralized theme and styling for the TUI
//!
//! Single source of truth for the colors, styles and fixed strings used by
//! the renderers in `ui`.

use ratatui::style::{Color, Modifier, Style};

use crate::wizard::PageKind;

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette
pub struct Colors;

impl Colors {
    /// Popup and overlay background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Error popup background
    pub const BG_DANGER: Color = Color::Rgb(30, 20, 20);

    pub const FG_PRIMARY: Color = Color::White;
    pub const FG_SECONDARY: Color = Color::Gray;
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Borders, titles, highlights
    pub const PRIMARY: Color = Color::Cyan;

    /// Focused rows, emphasis
    pub const SECONDARY: Color = Color::Yellow;

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    pub const SELECTED_BG: Color = Color::Yellow;
    pub const SELECTED_FG: Color = Color::Black;

    // Step indicator
    pub const STEP_ACTIVE: Color = Color::Yellow;
    pub const STEP_COMPLETE: Color = Color::Green;
    pub const STEP_PENDING: Color = Color::Gray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    /// Focused form row
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Field being edited
    pub fn editing() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    /// Enabled nav button
    pub fn button_active() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Disabled nav button
    pub fn button_disabled() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Key hint in the nav bar
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }
}

// =============================================================================
// THEME CONTEXT
// =============================================================================

/// Semantic style lookups
pub struct Theme;

impl Theme {
    /// Style for a step in the header indicator
    pub fn step_style(step: PageKind, current: PageKind) -> Style {
        let (step_idx, current_idx) = (step as usize, current as usize);
        if step_idx < current_idx {
            Style::default().fg(Colors::STEP_COMPLETE)
        } else if step_idx == current_idx {
            Style::default()
                .fg(Colors::STEP_ACTIVE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Colors::STEP_PENDING)
        }
    }

    /// Style for a line of the install log
    pub fn log_line_style(line: &str) -> Style {
        if line.starts_with("Installation SUCCESS") {
            Styles::success().add_modifier(Modifier::BOLD)
        } else if line.starts_with("Installation FAILED")
            || line.starts_with("Error writing config")
            || line.starts_with("Error starting installer")
        {
            Styles::error().add_modifier(Modifier::BOLD)
        } else {
            Styles::text()
        }
    }
}

// =============================================================================
// TEXT CONSTANTS
// =============================================================================

/// Fixed UI strings
pub struct UiText;

impl UiText {
    pub const APP_TITLE: &'static str = "Arch Installer Wizard";
    pub const DISMISS_HINT: &'static str = "Press Enter or Esc to dismiss";
    pub const HELP_CLOSE_HINT: &'static str = "Press ? or Esc to close";
    pub const QUIT_BLOCKED: &'static str = "Installation in progress, quitting is disabled";
    pub const WIPE_WARNING: &'static str = "Warning: Selected disk will be WIPED.";
    pub const INSTALL_WARNING: &'static str =
        "Press n to begin. This operation cannot be undone.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_styles_follow_position() {
        let done = Theme::step_style(PageKind::Welcome, PageKind::Account);
        let active = Theme::step_style(PageKind::Account, PageKind::Account);
        let pending = Theme::step_style(PageKind::Install, PageKind::Account);
        assert_eq!(done.fg, Some(Colors::STEP_COMPLETE));
        assert_eq!(active.fg, Some(Colors::STEP_ACTIVE));
        assert_eq!(pending.fg, Some(Colors::STEP_PENDING));
    }

    #[test]
    fn test_status_lines_are_highlighted() {
        assert_eq!(
            Theme::log_line_style("Installation SUCCESS! You can reboot now.").fg,
            Some(Colors::SUCCESS)
        );
        assert_eq!(
            Theme::log_line_style("Installation FAILED: exit status: 1").fg,
            Some(Colors::ERROR)
        );
        assert_eq!(Theme::log_line_style("pacstrap ok").fg, Some(Colors::FG_PRIMARY));
    }
}
