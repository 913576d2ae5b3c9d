//! Reusable UI components
//!
//! - `keybindings` - mode-aware key registry used for dispatch and hints
//! - `help_overlay` - floating help window
//! - `nav_bar` - bottom bar with Back/Next buttons and key hints

pub mod help_overlay;
pub mod keybindings;
pub mod nav_bar;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Rectangle of `width_percent` x `height_percent` centered in `area`,
/// clamped to at least `min_width` x `min_height` when room allows.
pub fn centered_rect(
    area: Rect,
    width_percent: u16,
    height_percent: u16,
    min_width: u16,
    min_height: u16,
) -> Rect {
    let width = (area.width * width_percent / 100)
        .max(min_width)
        .min(area.width);
    let height = (area.height * height_percent / 100)
        .max(min_height)
        .min(area.height);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside_and_centered() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(area, 60, 50, 10, 5);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn test_centered_rect_respects_minimum_and_bounds() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_rect(area, 10, 10, 50, 4);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 4);
    }
}
