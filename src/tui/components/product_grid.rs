//! Grid of product cards with a movable selection

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::{resolve_primary_image_or, Product};
use crate::tui::styles::Theme;
use crate::tui::utils::truncate_to_width;

/// Outer size of one card
pub const CARD_WIDTH: u16 = 34;
pub const CARD_HEIGHT: u16 = 8;

/// Product cards laid out in as many columns as the area allows
#[derive(Debug)]
pub struct ProductGrid {
    selected: usize,
    scroll_row: usize,
    columns: usize,
}

impl Default for ProductGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductGrid {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_row: 0,
            columns: 1,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Columns used by the last render
    #[cfg(test)]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Back to the first card, e.g. after a new page arrives
    pub fn reset(&mut self) {
        self.selected = 0;
        self.scroll_row = 0;
    }

    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move one row down, landing on the last card of a partial final row
    pub fn select_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let last_row = (len - 1) / self.columns;
        if self.selected / self.columns < last_row {
            self.selected = (self.selected + self.columns).min(len - 1);
        }
    }

    pub fn select_up(&mut self) {
        if self.selected >= self.columns {
            self.selected -= self.columns;
        }
    }

    pub fn columns_for(width: u16) -> usize {
        usize::from((width / CARD_WIDTH).max(1))
    }

    fn ensure_visible(&mut self, visible_rows: usize) {
        let row = self.selected / self.columns;
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        items: &[Product],
        theme: &Theme,
        placeholder: &str,
    ) {
        if items.is_empty() {
            return;
        }
        self.columns = Self::columns_for(area.width);
        self.selected = self.selected.min(items.len() - 1);

        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        self.ensure_visible(visible_rows);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (row_offset, row_area) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, self.columns as u32); self.columns])
                .split(*row_area);

            for (column, cell) in cells.iter().enumerate() {
                let index = (self.scroll_row + row_offset) * self.columns + column;
                let Some(product) = items.get(index) else {
                    return;
                };
                self.render_card(frame, *cell, product, index == self.selected, theme, placeholder);
            }
        }
    }

    fn render_card(
        &self,
        frame: &mut Frame,
        area: Rect,
        product: &Product,
        selected: bool,
        theme: &Theme,
        placeholder: &str,
    ) {
        let inner_width = usize::from(area.width.saturating_sub(2));
        let inner_height = usize::from(area.height.saturating_sub(2));

        let border_style = if selected {
            theme.focused_border_style()
        } else {
            theme.border_style()
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(
                truncate_to_width(&product.name, inner_width),
                theme.title_style(),
            ));
        if selected {
            block = block.style(theme.selection_style());
        }

        let lines = card_lines(product, placeholder, inner_width, inner_height, theme);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Card body: price, primary image, then as much description as fits
pub fn card_lines(
    product: &Product,
    placeholder: &str,
    width: usize,
    height: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(height);

    lines.push(match product.display_price() {
        Some(price) => Line::from(Span::styled(price, theme.price_style())),
        None => Line::from(Span::styled("No price", theme.placeholder_style())),
    });

    let image = resolve_primary_image_or(product, placeholder);
    lines.push(if image.is_empty() {
        Line::from(Span::styled("No image", theme.placeholder_style()))
    } else {
        Line::from(Span::styled(truncate_to_width(&image, width), theme.dim_style()))
    });

    if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let remaining = height.saturating_sub(lines.len());
        let wrapped = textwrap::wrap(description, width.max(1));
        let truncated = wrapped.len() > remaining;

        for (i, text) in wrapped.into_iter().take(remaining).enumerate() {
            let text = if truncated && i + 1 == remaining {
                truncate_to_width(&format!("{}…", text), width)
            } else {
                text.into_owned()
            };
            lines.push(Line::from(Span::styled(text, theme.text_style())));
        }
    }

    lines.truncate(height);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImageField;
    use ratatui::{backend::TestBackend, Terminal};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn products(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| Product::named(i as i64, &format!("Product {}", i)))
            .collect()
    }

    #[test]
    fn test_card_lines() {
        let theme = Theme::default();
        let mut product = Product::named(1, "Desk lamp");
        product.price = Some(19.5);
        product.images = Some(ImageField::Encoded(r#"["https://cdn.test/lamp.png"]"#.into()));
        product.description = Some("A warm light for late reading sessions at the desk".into());

        let lines = card_lines(&product, "", 20, 6, &theme);
        assert_eq!(text(&lines[0]), "$19.50");
        assert_eq!(text(&lines[1]), "https://cdn.test/la…");
        assert_eq!(text(&lines[2]), "A warm light");
        assert!(lines.len() <= 6);
    }

    #[test]
    fn test_card_lines_placeholders() {
        let theme = Theme::default();
        let product = Product::named(2, "Mystery box");

        let lines = card_lines(&product, "", 30, 6, &theme);
        assert_eq!(text(&lines[0]), "No price");
        assert_eq!(text(&lines[1]), "No image");
        assert_eq!(lines.len(), 2);

        let lines = card_lines(&product, "https://cdn.test/none.png", 30, 6, &theme);
        assert_eq!(text(&lines[1]), "https://cdn.test/none.png");
    }

    #[test]
    fn test_long_description_marked_truncated() {
        let theme = Theme::default();
        let mut product = Product::named(3, "Rug");
        product.description = Some("one two three four five six seven eight nine ten".into());

        let lines = card_lines(&product, "", 10, 4, &theme);
        assert_eq!(lines.len(), 4);
        assert!(text(&lines[3]).ends_with('…'));
    }

    #[test]
    fn test_selection_moves_by_row() {
        let mut grid = ProductGrid::new();
        grid.columns = 3;

        grid.select_down(8);
        assert_eq!(grid.selected(), 3);
        grid.select_down(8);
        assert_eq!(grid.selected(), 6);
        // No row below the last one
        grid.select_down(8);
        assert_eq!(grid.selected(), 6);

        grid.select_next(8);
        grid.select_next(8);
        grid.select_next(8);
        assert_eq!(grid.selected(), 7);

        grid.select_up();
        assert_eq!(grid.selected(), 4);
        grid.select_up();
        grid.select_up();
        assert_eq!(grid.selected(), 1);
        grid.select_previous();
        grid.select_previous();
        assert_eq!(grid.selected(), 0);
    }

    #[test]
    fn test_select_down_into_partial_row() {
        let mut grid = ProductGrid::new();
        grid.columns = 3;
        grid.selected = 2;

        // Row below only has one card
        grid.select_down(4);
        assert_eq!(grid.selected(), 3);
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut grid = ProductGrid::new();
        grid.columns = 2;
        grid.selected = 9;
        grid.ensure_visible(2);
        assert_eq!(grid.scroll_row, 3);

        grid.selected = 0;
        grid.ensure_visible(2);
        assert_eq!(grid.scroll_row, 0);
    }

    #[test]
    fn test_render_sets_columns() {
        let theme = Theme::default();
        let mut grid = ProductGrid::new();
        let items = products(12);
        let mut terminal = Terminal::new(TestBackend::new(CARD_WIDTH * 3, CARD_HEIGHT * 2)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.size();
                grid.render(frame, area, &items, &theme, "");
            })
            .unwrap();

        assert_eq!(grid.columns(), 3);
        assert_eq!(ProductGrid::columns_for(10), 1);
    }
}
