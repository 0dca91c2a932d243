use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::config::Config;
use crate::{tui, version};
use super::list::ListCommand;
use super::schema::SchemaCommand;

/// Browse a paginated product catalog from your terminal
#[derive(Parser, Debug)]
#[command(
    name = "catalog",
    version,
    about = "Browse a paginated product catalog from your terminal",
    long_about = r#"Catalog is a terminal browser for a paginated product API.
It shows products as a grid of cards with windowed page navigation.

Examples:
  catalog                              # Browse interactively from page 1
  catalog --page 4                     # Start on page 4
  catalog list --page 2                # Print page 2 and exit
  catalog list --json                  # Print page 1 as JSON
  catalog --base-url http://localhost:3000 list"#
)]
pub struct Cli {
    /// Configuration file (defaults to ./.catalog.json, ./catalog.json or the user config dir)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the catalog API
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Products per page
    #[arg(long = "limit", global = true)]
    pub limit: Option<u32>,

    /// Pages shown on each side of the current page
    #[arg(long = "page-window", global = true)]
    pub page_window: Option<u32>,

    /// Request timeout, e.g. "10s" or "1m"
    #[arg(long = "timeout", global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Page to open in interactive mode
    #[arg(short = 'p', long = "page", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page of products and exit
    List(ListCommand),

    /// Generate or validate the configuration file schema
    Schema(SchemaCommand),

    /// Show version and build information
    Version,
}

impl Cli {
    /// Whether this invocation takes over the terminal
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Where logs should go; `None` means stderr.
    ///
    /// The TUI owns the terminal, so interactive runs log to a file even
    /// without `--log-file`.
    pub fn log_target(&self) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(path.clone()),
            None if self.is_interactive() => Some(default_log_file()),
            None => None,
        }
    }

    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        match &self.command {
            Some(Commands::Version) => {
                println!("{}", version::build_info());
                return Ok(());
            }
            Some(Commands::Schema(schema_cmd)) => return schema_cmd.execute().await,
            _ => {}
        }

        // Initialize configuration
        let mut config = Config::init(self.config.as_deref()).await?;
        self.apply_overrides(&mut config);
        debug!("Configuration initialized: {:?}", config);

        match &self.command {
            Some(Commands::List(list_cmd)) => list_cmd.execute(&config).await,
            _ => self.start_interactive_mode(config).await,
        }
    }

    /// Command-line flags take precedence over file and environment
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(page_window) = self.page_window {
            config.page_window = page_window;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
    }

    async fn start_interactive_mode(&self, config: Config) -> Result<()> {
        info!("Starting interactive mode");

        // Validate the configuration
        config.validate()?;

        // Setup signal handling for graceful shutdown
        self.setup_signal_handling();

        let app = App::new(config)?;
        app.run_interactive(self.page).await?;

        info!("Application finished");
        Ok(())
    }

    fn setup_signal_handling(&self) {
        tokio::spawn(async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};

                let (mut sigint, mut sigterm) =
                    match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                        (Err(e), _) | (_, Err(e)) => {
                            warn!("Failed to install signal handlers: {}", e);
                            return;
                        }
                    };

                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully");
                    }
                }
            }

            #[cfg(windows)]
            {
                let mut ctrl_break = match tokio::signal::windows::ctrl_break() {
                    Ok(handler) => handler,
                    Err(e) => {
                        warn!("Failed to install Ctrl+Break handler: {}", e);
                        return;
                    }
                };
                ctrl_break.recv().await;
                info!("Received Ctrl+Break, shutting down gracefully");
            }

            if let Err(e) = tui::reset_terminal() {
                warn!("Failed to restore terminal: {}", e);
            }
            std::process::exit(130);
        });
    }
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join(format!("{}.log", version::APP_NAME))
}
