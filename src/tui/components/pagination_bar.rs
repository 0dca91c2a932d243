//! Pagination bar for the product grid.
//!
//! Renders the windowed page range with previous/next arrows, the
//! "Showing x to y of z results" summary, and an optional go-to-page prompt.
//! Below [`NARROW_WIDTH`] columns the collapsible part of the range is hidden
//! so the bar still fits on one line.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::CatalogView;
use crate::pagination::{is_collapsible, PageRangeEntry};
use crate::tui::styles::Theme;

/// Terminal width under which collapsible range entries are hidden
pub const NARROW_WIDTH: u16 = 60;

/// Rows the bar occupies, including its top border
pub const BAR_HEIGHT: u16 = 4;

const MAX_INPUT_DIGITS: usize = 9;

/// Result of feeding a key to the go-to-page prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The user confirmed a page number
    Submitted(u32),
    /// The prompt closed without a usable page
    Cancelled,
    /// The key edited the input
    Editing,
    /// The key is not handled by the prompt
    Ignored,
}

/// Navigation state for "Go to page" functionality
#[derive(Debug, Clone, Default)]
struct GoToPrompt {
    input: String,
    active: bool,
}

/// Pagination controls shown under the product grid
#[derive(Debug, Default)]
pub struct PaginationBar {
    prompt: GoToPrompt,
}

impl PaginationBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prompt_active(&self) -> bool {
        self.prompt.active
    }

    pub fn prompt_input(&self) -> &str {
        &self.prompt.input
    }

    /// Start "Go to page" input mode
    pub fn start_goto_page(&mut self) {
        self.prompt.active = true;
        self.prompt.input.clear();
    }

    /// Cancel "Go to page" input
    pub fn cancel_goto_page(&mut self) {
        self.prompt.active = false;
        self.prompt.input.clear();
    }

    /// Handle keyboard input for "Go to page" mode
    pub fn handle_prompt_key(&mut self, key: KeyEvent) -> PromptOutcome {
        if !self.prompt.active {
            return PromptOutcome::Ignored;
        }

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.prompt.input.len() < MAX_INPUT_DIGITS {
                    self.prompt.input.push(c);
                }
                PromptOutcome::Editing
            }
            KeyCode::Backspace => {
                self.prompt.input.pop();
                PromptOutcome::Editing
            }
            KeyCode::Enter => {
                let outcome = match self.prompt.input.parse::<u32>() {
                    Ok(page) if page > 0 => PromptOutcome::Submitted(page),
                    _ => PromptOutcome::Cancelled,
                };
                self.cancel_goto_page();
                outcome
            }
            KeyCode::Esc => {
                self.cancel_goto_page();
                PromptOutcome::Cancelled
            }
            _ => PromptOutcome::Ignored,
        }
    }

    /// Build the bar's text lines for a terminal `width` columns wide
    pub fn lines(&self, view: &CatalogView, width: u16, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![
            Self::numbers_line(view, width < NARROW_WIDTH, theme),
            Self::summary_line(view, theme),
        ];

        if self.prompt.active {
            lines.push(Line::from(vec![
                Span::styled("Go to page: ", theme.text_style()),
                Span::styled(self.prompt_input().to_string(), theme.input_style()),
                Span::styled("_", theme.input_style()),
                Span::styled(
                    format!("  (1-{}, Enter to jump, Esc to cancel)", view.total_pages),
                    theme.dim_style(),
                ),
            ]));
        }

        lines
    }

    /// "< 1 ... 4 5 [6] 7 8 ... 20 >"
    fn numbers_line(view: &CatalogView, compact: bool, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::new();

        let prev_style = if view.has_previous {
            theme.navigation_style()
        } else {
            theme.disabled_style()
        };
        spans.push(Span::styled("< ", prev_style));

        let len = view.page_range.len();
        for (index, entry) in view.page_range.iter().enumerate() {
            if compact && is_collapsible(index, len) {
                continue;
            }
            match entry {
                PageRangeEntry::Page(page) if *page == view.current_page => {
                    spans.push(Span::styled(format!("[{}]", page), theme.current_page_style()));
                }
                PageRangeEntry::Page(page) => {
                    spans.push(Span::styled(page.to_string(), theme.page_style()));
                }
                PageRangeEntry::Ellipsis => {
                    spans.push(Span::styled(entry.to_string(), theme.disabled_style()));
                }
            }
            spans.push(Span::raw(" "));
        }

        let next_style = if view.has_next {
            theme.navigation_style()
        } else {
            theme.disabled_style()
        };
        spans.push(Span::styled(">", next_style));

        Line::from(spans)
    }

    fn summary_line(view: &CatalogView, theme: &Theme) -> Line<'static> {
        let span = view.item_span;
        let text = if span.total == 0 {
            format!("Page {} of {}  ·  No results", view.current_page, view.total_pages)
        } else {
            format!(
                "Page {} of {}  ·  Showing {} to {} of {} results",
                view.current_page, view.total_pages, span.start, span.end, span.total
            )
        };
        Line::from(Span::styled(text, theme.dim_style()))
    }

    /// Render pagination controls
    pub fn render(&self, frame: &mut Frame, area: Rect, view: &CatalogView, theme: &Theme) {
        let paragraph = Paragraph::new(self.lines(view, area.width, theme))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(theme.border_style()),
            );
        frame.render_widget(paragraph, area);
    }
}
