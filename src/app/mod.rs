//! Core application logic and orchestration
//!
//! This module wires the configured product source to the fetch orchestrator
//! and hands the result to either the terminal UI or a console presenter.

mod events;
mod orchestrator;
mod presenter;

pub use events::*;
pub use orchestrator::*;
pub use presenter::*;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    api::{HttpClientOptions, HttpProductClient, ProductFetchPort},
    config::Config,
    tui,
};

/// Main application structure
pub struct App {
    config: Config,
    port: Arc<dyn ProductFetchPort>,
}

impl App {
    /// Create an application backed by the HTTP catalog API
    pub fn new(config: Config) -> Result<Self> {
        debug!("Creating new App instance");

        let client = HttpProductClient::new(HttpClientOptions::from(&config))?;
        info!("Using catalog endpoint {}", client.endpoint());

        Ok(Self::with_port(config, Arc::new(client)))
    }

    /// Create an application backed by any product source
    pub fn with_port(config: Config, port: Arc<dyn ProductFetchPort>) -> Self {
        Self { config, port }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build an orchestrator for this app's product source
    pub fn orchestrator<P: Presenter>(&self, presenter: P) -> FetchOrchestrator<P> {
        debug!("Creating orchestrator over '{}' source", self.port.name());
        FetchOrchestrator::new(
            Arc::clone(&self.port),
            presenter,
            OrchestratorOptions::from(&self.config),
        )
    }

    /// Run the application in interactive mode (TUI)
    pub async fn run_interactive(&self, start_page: u32) -> Result<()> {
        info!("Starting interactive mode at page {}", start_page);
        let orchestrator = self.orchestrator(LatestView::default());
        tui::run(orchestrator, start_page, &self.config).await
    }

    /// Load a single page and report it through `presenter`
    pub async fn run_non_interactive<P: Presenter>(&self, page: u32, presenter: P) -> LoadOutcome {
        info!("Loading page {} non-interactively", page);
        let mut orchestrator = self.orchestrator(presenter);
        orchestrator.load_page(page).await
    }
}
