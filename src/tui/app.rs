use crate::app::{CatalogView, FetchOrchestrator, Intent, LatestView, LoadOutcome, PendingLoad, Phase};
use crate::tui::{
    components::{
        pagination_bar::{PaginationBar, PromptOutcome, BAR_HEIGHT},
        product_grid::ProductGrid,
    },
    events::Event,
    keys::{Action, KeyMap},
    styles::Theme,
    utils::layout::centered_rect_percent,
    Frame,
};
use anyhow::Result;
use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main application state and controller
pub struct App {
    /// Page loads and pagination state
    orchestrator: FetchOrchestrator<LatestView>,

    /// Product cards
    grid: ProductGrid,

    /// Page numbers and go-to-page prompt
    pagination: PaginationBar,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Shown when a product has no image
    placeholder_image: String,

    /// Event sender for fetch completions
    event_sender: mpsc::UnboundedSender<Event>,

    /// Task running the latest fetch
    fetch_task: Option<JoinHandle<()>>,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Show help text
    pub show_help: bool,

    /// Status message to display
    pub status_message: Option<String>,

    spinner_frame: usize,
}

impl App {
    /// Create a new application instance
    pub fn new(
        orchestrator: FetchOrchestrator<LatestView>,
        event_sender: mpsc::UnboundedSender<Event>,
        placeholder_image: String,
    ) -> Self {
        Self {
            orchestrator,
            grid: ProductGrid::new(),
            pagination: PaginationBar::new(),
            key_map: KeyMap::default(),
            theme: Theme::default(),
            placeholder_image,
            event_sender,
            fetch_task: None,
            should_quit: false,
            show_help: false,
            status_message: None,
            spinner_frame: 0,
        }
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator<LatestView> {
        &self.orchestrator
    }

    /// Whether a page request is still outstanding
    pub fn is_loading(&self) -> bool {
        self.orchestrator.in_flight().is_some()
    }

    /// Start loading `page`
    pub fn load(&mut self, page: u32) {
        let pending = self.orchestrator.begin(page);
        self.spawn_fetch(pending);
    }

    fn spawn_fetch(&mut self, pending: PendingLoad) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        self.grid.reset();

        let fetch = self.orchestrator.fetch(pending);
        let sender = self.event_sender.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = fetch.await;
            if sender.send(Event::FetchCompleted { pending, result }).is_err() {
                debug!("Event loop gone before request #{} completed", pending.seq);
            }
        }));
    }

    fn navigate(&mut self, intent: Intent) {
        match self.orchestrator.dispatch(intent) {
            Some(pending) => self.spawn_fetch(pending),
            None => {
                let state = self.orchestrator.state();
                self.status_message = Some(match intent {
                    Intent::Next | Intent::Last => "Already on the last page".to_string(),
                    Intent::Previous | Intent::First => "Already on the first page".to_string(),
                    Intent::GoToPage { page } if page == state.current_page() => {
                        format!("Already on page {}", page)
                    }
                    Intent::GoToPage { page } => {
                        format!("Page {} is out of range (1-{})", page, state.total_pages())
                    }
                    Intent::Reload => return,
                });
            }
        }
    }

    /// Stop any fetch still running
    pub fn shutdown(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    /// Handle incoming events; returns `true` once the app should exit
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            // Layout is recomputed on every draw
            Event::Resize(_, _) => {}
            Event::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
            Event::FetchCompleted { pending, result } => {
                match self.orchestrator.complete(pending, result) {
                    LoadOutcome::Success | LoadOutcome::Failure(_) => {
                        self.fetch_task = None;
                    }
                    LoadOutcome::Superseded => {}
                }
            }
        }

        Ok(self.should_quit)
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.pagination.is_prompt_active() {
            // Ctrl+C still quits while typing a page number
            if key.modifiers.contains(KeyModifiers::CONTROL) && self.key_map.should_quit(&key) {
                self.should_quit = true;
                return;
            }
            match self.pagination.handle_prompt_key(key) {
                PromptOutcome::Submitted(page) => self.navigate(Intent::GoToPage { page }),
                PromptOutcome::Cancelled | PromptOutcome::Editing | PromptOutcome::Ignored => {}
            }
            return;
        }

        let Some(action) = self.key_map.action(&key) else {
            return;
        };
        self.status_message = None;

        if self.show_help && action != Action::Quit {
            self.show_help = false;
            if action == Action::ToggleHelp {
                return;
            }
        }

        let len = self.orchestrator.state().items().len();
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = true,
            Action::Navigate(intent) => self.navigate(intent),
            Action::OpenGoToPrompt => self.pagination.start_goto_page(),
            Action::SelectUp => self.grid.select_up(),
            Action::SelectDown => self.grid.select_down(len),
            Action::SelectNext => self.grid.select_next(len),
            Action::SelectPrevious => self.grid.select_previous(),
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        let len = self.orchestrator.state().items().len();
        match event.kind {
            MouseEventKind::ScrollDown => self.grid.select_down(len),
            MouseEventKind::ScrollUp => self.grid.select_up(),
            _ => {}
        }
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),          // Header
                Constraint::Min(3),             // Product grid
                Constraint::Length(BAR_HEIGHT), // Pagination
                Constraint::Length(1),          // Status bar
            ])
            .split(frame.size());

        let fallback;
        let view = match self.orchestrator.presenter().view() {
            Some(view) => view,
            None => {
                fallback = self.orchestrator.view();
                &fallback
            }
        };

        let spinner = SPINNER[self.spinner_frame % SPINNER.len()];
        let mut header = vec![Span::styled(" Product Catalog", self.theme.title_style())];
        if view.phase == Phase::Loading {
            header.push(Span::styled(format!("  {}", spinner), self.theme.navigation_style()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(header)).style(self.theme.base_style()),
            chunks[0],
        );

        match view.phase {
            Phase::Idle | Phase::Loading => {
                let text = format!("{} Loading page {}...", spinner, view.current_page);
                render_centered(frame, chunks[1], vec![Line::from(text)], self.theme.text_style());
            }
            Phase::Error => {
                let message = view.error_message.clone().unwrap_or_default();
                let lines = vec![
                    Line::from(Span::styled(message, self.theme.error_style())),
                    Line::from(""),
                    Line::from(Span::styled("Press r to retry", self.theme.dim_style())),
                ];
                render_centered(frame, chunks[1], lines, self.theme.text_style());
            }
            Phase::Ready if view.items.is_empty() => {
                render_centered(
                    frame,
                    chunks[1],
                    vec![Line::from("No products found")],
                    self.theme.placeholder_style(),
                );
            }
            Phase::Ready => {
                self.grid
                    .render(frame, chunks[1], &view.items, &self.theme, &self.placeholder_image);
            }
        }

        self.pagination.render(frame, chunks[2], view, &self.theme);
        self.render_status_bar(frame, chunks[3], view);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect, view: &CatalogView) {
        let status_text = match &self.status_message {
            Some(message) => format!(" {}", message),
            None if view.items.is_empty() => " ? help | q quit".to_string(),
            None => format!(
                " Product {} of {} | ? help | q quit",
                self.grid.selected() + 1,
                view.items.len()
            ),
        };

        let status_paragraph = Paragraph::new(status_text).style(self.theme.status_bar_style());
        frame.render_widget(status_paragraph, area);
    }

    /// Render help overlay
    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect_percent(60, 60, frame.size());

        let help_block = Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .border_style(self.theme.focused_border_style())
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(self.key_map.help_text())
            .block(help_block)
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>, style: ratatui::style::Style) {
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let inner = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };
    let paragraph = Paragraph::new(lines)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}
