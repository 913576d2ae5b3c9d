//! Navigation bar
//!
//! Back and Next/Install buttons reflecting `NavState`, followed by the key
//! hints of the current mode.

use super::keybindings::NavBarItem;
use crate::theme::Styles;
use crate::wizard::NavState;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

pub struct NavBar {
    nav: NavState,
    items: Vec<NavBarItem>,
}

impl NavBar {
    pub fn new(nav: NavState, items: Vec<NavBarItem>) -> Self {
        Self { nav, items }
    }

    fn button(label: &str, key: char, enabled: bool) -> Span<'static> {
        let style = if enabled {
            Styles::button_active()
        } else {
            Styles::button_disabled()
        };
        Span::styled(format!(" {label} ({key}) "), style)
    }

    /// Spans making up the bar, buttons first
    pub fn spans(&self) -> Vec<Span<'static>> {
        let mut spans = vec![
            Self::button("Back", 'b', self.nav.back_enabled),
            Span::raw(" "),
            Self::button(self.nav.forward_label, 'n', self.nav.forward_enabled),
            Span::raw("   "),
        ];
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", Styles::nav_hint()));
            }
            spans.push(Span::styled(item.key_display.clone(), Styles::key_hint()));
            spans.push(Span::styled(format!(" {}", item.action_label), Styles::nav_hint()));
        }
        spans
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(Paragraph::new(Line::from(self.spans())), area);
    }
}
