//! Dialog rendering
//!
//! The blocking error popup shown for validation failures and for errors
//! raised while launching external programs.

use crate::components::centered_rect;
use crate::theme::{Colors, Styles, UiText};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the error popup over `parent`
pub fn render_error_popup(f: &mut Frame, parent: Rect, message: &str) {
    let area = centered_rect(parent, 50, 25, 40, 7);
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .title_bottom(Line::from(UiText::DISMISS_HINT).centered())
        .borders(Borders::ALL)
        .border_style(Styles::error())
        .style(Style::default().bg(Colors::BG_DANGER));

    let body = Paragraph::new(vec![Line::from(""), Line::styled(message.to_string(), Styles::text())])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, area);
}
