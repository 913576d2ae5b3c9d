//! Help overlay component
//!
//! Displays context-sensitive help in a floating window.

use super::centered_rect;
use super::keybindings::{HelpSection, KeybindingContext};
use crate::app::AppMode;
use crate::theme::{Colors, UiText};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Help overlay component
pub struct HelpOverlay {
    content: Vec<Line<'static>>,
}

impl HelpOverlay {
    /// Create a new help overlay for the given mode
    pub fn new(mode: AppMode, keybinding_ctx: &KeybindingContext) -> Self {
        let sections = keybinding_ctx.get_help_content(mode);
        Self {
            content: Self::build_content(&sections, mode),
        }
    }

    fn build_content(sections: &[HelpSection], mode: AppMode) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(vec![Span::styled(
            "  Arch Installer Wizard Help  ",
            Style::default()
                .fg(Colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(""));

        let mode_name = match mode {
            AppMode::Form => "Wizard",
            AppMode::Editing => "Editing",
            AppMode::Installing => "Installing",
            AppMode::Finished => "Finished",
        };
        lines.push(Line::from(vec![
            Span::styled("Current: ", Style::default().fg(Colors::FG_MUTED)),
            Span::styled(mode_name, Style::default().fg(Colors::SECONDARY)),
        ]));
        lines.push(Line::from(""));

        for section in sections {
            lines.push(Line::from(vec![Span::styled(
                format!("  {}  ", section.title),
                Style::default()
                    .fg(Colors::SUCCESS)
                    .add_modifier(Modifier::BOLD),
            )]));
            for (key, description) in &section.items {
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(
                        format!("{:<10}", key),
                        Style::default()
                            .fg(Colors::PRIMARY)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(description.clone(), Style::default().fg(Colors::FG_PRIMARY)),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines
    }

    /// Number of lines in the overlay body
    pub fn line_count(&self) -> usize {
        self.content.len()
    }

    /// Render the help overlay
    pub fn render(&self, f: &mut Frame, parent: Rect) {
        let area = centered_rect(parent, 60, 70, 50, 15);
        f.render_widget(Clear, area);

        let block = Block::default()
            .title(" Help ")
            .title_bottom(Line::from(UiText::HELP_CLOSE_HINT).centered())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Colors::PRIMARY))
            .style(Style::default().bg(Colors::BG_PRIMARY));
        f.render_widget(Paragraph::new(self.content.clone()).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_lists_every_section() {
        let ctx = KeybindingContext::new();
        let overlay = HelpOverlay::new(AppMode::Form, &ctx);
        let sections = ctx.get_help_content(AppMode::Form);
        let items: usize = sections.iter().map(|s| s.items.len() + 2).sum();
        // Title, blank, mode line, blank, then each section
        assert_eq!(overlay.line_count(), 4 + items);
    }
}
