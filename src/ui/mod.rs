//! User interface rendering module
//!
//! - `header` - title and step indicator
//! - `pages` - wizard step bodies and form rows
//! - `installer` - install log view
//! - `dialogs` - error popup

mod dialogs;
mod header;
pub mod installer;
pub mod pages;

use crate::app::{App, AppMode};
use crate::components::help_overlay::HelpOverlay;
use crate::components::nav_bar::NavBar;
use crate::theme::Styles;
use header::HeaderRenderer;
use pages::PageView;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Line,
    widgets::Paragraph,
};

/// Draws the whole screen from the application state
#[derive(Debug, Default)]
pub struct UiRenderer {
    header: HeaderRenderer,
}

impl UiRenderer {
    pub fn new() -> Self {
        Self {
            header: HeaderRenderer::new(),
        }
    }

    pub fn render(&self, f: &mut Frame, app: &App) {
        let wizard = app.wizard();
        let state = app.state();

        let [header_area, body_area, nav_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(f.area());

        self.header
            .render_header(f, header_area, wizard.pages(), wizard.current());

        match state.mode {
            AppMode::Installing | AppMode::Finished => installer::render_install_log(
                f,
                body_area,
                &state.log,
                state.mode == AppMode::Installing,
            ),
            AppMode::Form | AppMode::Editing => {
                let fields = app.visible_fields();
                PageView {
                    page: wizard.current(),
                    config: wizard.config(),
                    fields: &fields,
                    focus: state.focus,
                    mode: state.mode,
                    edit: state.edit.as_ref(),
                }
                .render(f, body_area);
            }
        }

        let items = app
            .keybinding_context()
            .get_nav_items(state.mode, wizard.current());
        NavBar::new(wizard.nav(), items).render(f, nav_area);

        let status_style = if state.mode == AppMode::Finished {
            match app.install_succeeded() {
                Some(true) => Styles::success(),
                Some(false) => Styles::error(),
                None => Styles::text_muted(),
            }
        } else {
            Styles::text_muted()
        };
        f.render_widget(
            Paragraph::new(Line::styled(state.status_message.clone(), status_style)),
            status_area,
        );

        if state.help_visible {
            HelpOverlay::new(state.mode, app.keybinding_context()).render(f, f.area());
        }
        if let Some(message) = &state.popup {
            dialogs::render_error_popup(f, f.area(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceCatalog;
    use crate::settings::Settings;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let renderer = UiRenderer::new();
        terminal.draw(|f| renderer.render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_welcome_screen() {
        let app = App::new(&Settings::default(), DeviceCatalog::default());
        let text = screen(&app);
        assert!(text.contains("Arch Installer Wizard"));
        assert!(text.contains("Welcome to Arch Linux Installer"));
        assert!(text.contains("Back (b)"));
        assert!(text.contains("Next (n)"));
    }
}
