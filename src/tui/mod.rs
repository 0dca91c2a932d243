//! Terminal User Interface module using ratatui

mod app;
mod components;
mod events;
mod keys;
mod styles;
mod utils;

use app::App;
use events::EventHandler;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::{FetchOrchestrator, LatestView};
use crate::config::Config;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Restore the terminal without a handle, e.g. from a panic hook
pub fn reset_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Main TUI entry point: browse the catalog starting at `start_page`
pub async fn run(
    orchestrator: FetchOrchestrator<LatestView>,
    start_page: u32,
    config: &Config,
) -> Result<()> {
    let mut terminal = init_terminal()?;
    let mut event_handler = EventHandler::new(TICK_RATE);
    let mut app = App::new(
        orchestrator,
        event_handler.sender(),
        config.placeholder_image.clone(),
    );

    app.load(start_page);
    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;
    app.shutdown();

    restore_terminal(&mut terminal)?;
    info!("Left interactive mode on page {}", app.orchestrator().state().current_page());
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        match event_handler.next().await {
            Some(event) => {
                if app.handle_event(event)? {
                    break; // Exit requested
                }
            }
            None => {
                debug!("Event channel closed");
                break;
            }
        }
    }
    Ok(())
}
