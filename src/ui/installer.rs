//! Install log view
//!
//! Shows the accumulated installer output. The view follows new output
//! until the operator scrolls up, and the final status line is highlighted.

use crate::app::LogView;
use crate::theme::{Styles, Theme};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Lines of `log` visible in a viewport `height` rows tall
pub fn visible_lines(log: &LogView, height: usize) -> Vec<Line<'static>> {
    let top = log.top_line(height);
    log.text()
        .lines()
        .skip(top)
        .take(height)
        .map(|line| Line::styled(line.to_string(), Theme::log_line_style(line)))
        .collect()
}

/// Render the log inside a titled block
pub fn render_install_log(f: &mut Frame, area: Rect, log: &LogView, running: bool) {
    let title = if running {
        " Installing Arch Linux... "
    } else {
        " Installation Log "
    };
    let mut block = Block::default()
        .title(Span::styled(title, Styles::title()))
        .borders(Borders::ALL)
        .border_style(Styles::border_active());
    if !log.is_following() {
        block = block.title_bottom(Line::styled(" End: follow output ", Styles::warning()).right_aligned());
    }

    let height = area.height.saturating_sub(2) as usize;
    f.render_widget(Paragraph::new(visible_lines(log, height)).block(block), area);
}
