//! Header rendering
//!
//! Application title and the step indicator, one entry per wizard step with
//! completed, current and pending steps styled apart.

use crate::theme::{Styles, Theme, UiText};
use crate::wizard::PageKind;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Header renderer
#[derive(Debug, Default)]
pub struct HeaderRenderer;

impl HeaderRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the title block with the step indicator inside
    pub fn render_header(&self, f: &mut Frame, area: Rect, pages: &[PageKind], current: PageKind) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let header = Paragraph::new(Self::step_line(pages, current))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Styles::border_active())
                    .title(Span::styled(format!(" {} ", UiText::APP_TITLE), Styles::title())),
            )
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    /// `1 Welcome > 2 Storage > ...`
    pub fn step_line(pages: &[PageKind], current: PageKind) -> Line<'static> {
        let mut spans = Vec::with_capacity(pages.len() * 2);
        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" > ", Styles::text_muted()));
            }
            spans.push(Span::styled(
                format!("{} {}", i + 1, page.short_name()),
                Theme::step_style(*page, current),
            ));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_line_lists_every_page() {
        let line = HeaderRenderer::step_line(&PageKind::ALL, PageKind::Storage);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.starts_with("1 "));
        assert_eq!(text.matches(" > ").count(), PageKind::ALL.len() - 1);
        assert_eq!(line.spans[2].style, Theme::step_style(PageKind::Storage, PageKind::Storage));
    }
}
