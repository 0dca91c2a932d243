//! Fetch orchestration for the product listing.
//!
//! Every page request is stamped with a sequence number when it is issued.
//! Only the response carrying the latest number is applied; anything older
//! is dropped, so rapid navigation never renders an out-of-order page.
//!
//! A load is split into three steps so that UI drivers can keep handling
//! input while a request is in flight:
//!
//! 1. [`FetchOrchestrator::begin`] enters `Loading` and returns a ticket
//! 2. [`FetchOrchestrator::fetch`] produces a `'static` future for the ticket
//! 3. [`FetchOrchestrator::complete`] applies or discards the result
//!
//! [`FetchOrchestrator::load_page`] runs all three in sequence.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{FetchError, FetchResult, PageMetadata, Product, ProductFetchPort, ProductPage};
use crate::app::events::Intent;
use crate::app::presenter::{CatalogView, Phase, Presenter};
use crate::config::Config;
use crate::pagination::{Cursor, PaginationState};

/// Tunables for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub limit: u32,
    pub page_window: u32,
    pub timeout: Duration,
}

impl From<&Config> for OrchestratorOptions {
    fn from(config: &Config) -> Self {
        Self {
            limit: config.limit,
            page_window: config.page_window,
            timeout: config.request_timeout,
        }
    }
}

/// Ticket for an issued page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoad {
    pub seq: u64,
    pub page: u32,
    pub limit: u32,
}

/// How a page request settled
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Success,
    Failure(FetchError),
    /// A newer request was issued before this one completed
    Superseded,
}

/// Owns the pagination state and sequences page loads against a product source
pub struct FetchOrchestrator<P: Presenter> {
    state: PaginationState,
    port: Arc<dyn ProductFetchPort>,
    presenter: P,
    options: OrchestratorOptions,
    phase: Phase,
    error_message: Option<String>,
    latest_seq: u64,
    in_flight: Option<PendingLoad>,
    /// Cursor after the last successfully applied response
    settled: Cursor,
}

impl<P: Presenter> FetchOrchestrator<P> {
    pub fn new(port: Arc<dyn ProductFetchPort>, presenter: P, options: OrchestratorOptions) -> Self {
        let state = PaginationState::new(options.limit);
        let settled = state.cursor();
        Self {
            state,
            port,
            presenter,
            options,
            phase: Phase::Idle,
            error_message: None,
            latest_seq: 0,
            in_flight: None,
            settled,
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The most recently issued request, while it has not settled
    pub fn in_flight(&self) -> Option<PendingLoad> {
        self.in_flight
    }

    /// Current snapshot for presenters
    pub fn view(&self) -> CatalogView {
        CatalogView::from_state(
            &self.state,
            self.phase,
            self.error_message.clone(),
            self.options.page_window,
        )
    }

    fn notify(&mut self) {
        let view = self.view();
        self.presenter.on_state_change(&view);
    }

    /// Issue a request for `page`, superseding any request still in flight
    pub fn begin(&mut self, page: u32) -> PendingLoad {
        self.latest_seq += 1;
        let pending = PendingLoad {
            seq: self.latest_seq,
            page,
            limit: self.options.limit,
        };

        if let Some(previous) = self.in_flight.replace(pending) {
            debug!(
                "Request #{} for page {} superseded by #{}",
                previous.seq, previous.page, pending.seq
            );
        }

        self.phase = Phase::Loading;
        self.error_message = None;
        self.notify();

        debug!("Issued request #{} for page {}", pending.seq, page);
        pending
    }

    /// Future performing the fetch for `pending`, bounded by the request timeout.
    ///
    /// The future owns everything it needs and may be spawned.
    pub fn fetch(
        &self,
        pending: PendingLoad,
    ) -> impl Future<Output = FetchResult<ProductPage>> + Send + 'static {
        let port = Arc::clone(&self.port);
        let timeout = self.options.timeout;
        async move {
            match tokio::time::timeout(timeout, port.fetch(pending.page, pending.limit)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            }
        }
    }

    /// Apply the result of `pending` if it is still the latest request
    pub fn complete(&mut self, pending: PendingLoad, result: FetchResult<ProductPage>) -> LoadOutcome {
        if pending.seq != self.latest_seq {
            debug!(
                "Discarding stale response #{} for page {} (latest is #{})",
                pending.seq, pending.page, self.latest_seq
            );
            return LoadOutcome::Superseded;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let mut meta = page.meta.unwrap_or_default();
                if meta.page.map_or(true, |p| p == 0) {
                    meta.page = Some(pending.page);
                }
                self.apply(&meta, page.data);

                info!(
                    "Loaded page {} of {} ({} products)",
                    self.state.current_page(),
                    self.state.total_pages(),
                    self.state.items().len()
                );
                self.phase = Phase::Ready;
                self.error_message = None;
                self.notify();
                LoadOutcome::Success
            }
            Err(error) => {
                warn!("Error loading products for page {}: {}", pending.page, error);

                if self.state.cursor() != self.settled {
                    debug!("Restoring page {} after failed load", self.settled.page);
                    self.state.restore_cursor(self.settled);
                }

                self.phase = Phase::Error;
                self.error_message = Some(error.user_message().to_string());
                self.notify();
                LoadOutcome::Failure(error)
            }
        }
    }

    fn apply(&mut self, meta: &PageMetadata, items: Option<Vec<Product>>) {
        self.state.apply_result(Some(meta), items);
        self.settled = self.state.cursor();
    }

    /// Load `page` end to end
    pub async fn load_page(&mut self, page: u32) -> LoadOutcome {
        let pending = self.begin(page);
        let result = self.fetch(pending).await;
        self.complete(pending, result)
    }

    /// Request the next page; `None` when there is none
    pub fn next(&mut self) -> Option<PendingLoad> {
        if !self.state.request_next() {
            debug!("No next page after {}", self.state.current_page());
            return None;
        }
        Some(self.begin(self.state.current_page()))
    }

    /// Request the previous page; `None` when there is none
    pub fn previous(&mut self) -> Option<PendingLoad> {
        if !self.state.request_previous() {
            debug!("No previous page before {}", self.state.current_page());
            return None;
        }
        Some(self.begin(self.state.current_page()))
    }

    /// Request `page`; `None` when it is out of range or already current
    pub fn go_to_page(&mut self, page: u32) -> Option<PendingLoad> {
        if page == self.state.current_page() {
            return None;
        }
        if !self.state.request_page(page) {
            debug!(
                "Ignoring jump to page {} (valid range 1..={})",
                page,
                self.state.total_pages()
            );
            return None;
        }
        Some(self.begin(page))
    }

    pub fn first(&mut self) -> Option<PendingLoad> {
        self.go_to_page(1)
    }

    pub fn last(&mut self) -> Option<PendingLoad> {
        self.go_to_page(self.state.total_pages())
    }

    /// Re-request the current page, e.g. after an error
    pub fn reload(&mut self) -> PendingLoad {
        self.begin(self.state.current_page())
    }

    /// Route a navigation intent to the matching operation
    pub fn dispatch(&mut self, intent: Intent) -> Option<PendingLoad> {
        debug!("Dispatching intent: {}", intent);
        match intent {
            Intent::Next => self.next(),
            Intent::Previous => self.previous(),
            Intent::GoToPage { page } => self.go_to_page(page),
            Intent::First => self.first(),
            Intent::Last => self.last(),
            Intent::Reload => Some(self.reload()),
        }
    }
}
