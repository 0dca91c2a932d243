use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Layout utilities for TUI components
pub mod layout {
    use super::*;

    /// Create a centered rectangle with percentage of the parent area
    pub fn centered_rect_percent(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_to_width("Lamp", 10), "Lamp");
        assert_eq!(truncate_to_width("Lamp", 4), "Lamp");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate_to_width("Standing desk", 8), "Standin…");
        assert_eq!(truncate_to_width("Standing desk", 0), "");
        assert_eq!(truncate_to_width("Standing desk", 1), "…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character takes two columns
        assert_eq!(truncate_to_width("日本語のテキスト", 7), "日本語…");
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = layout::centered_rect_percent(60, 50, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 25);
        assert_eq!(popup.x, 20);
    }
}
