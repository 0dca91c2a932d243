//! Presenter boundary between the orchestrator and a concrete UI

use serde::Serialize;

use crate::api::Product;
use crate::pagination::{compute_range, PageRangeEntry, PaginationState};

/// Presentation phase of the product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    /// A page request is in flight
    Loading,
    /// The latest request succeeded
    Ready,
    /// The latest request failed
    Error,
}

/// "Showing start to end of total results"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemSpan {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

/// Snapshot handed to the presenter after every state change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub phase: Phase,
    pub items: Vec<Product>,
    pub page_range: Vec<PageRangeEntry>,
    pub has_next: bool,
    pub has_previous: bool,
    pub current_page: u32,
    pub total_pages: u32,
    pub item_span: ItemSpan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CatalogView {
    pub fn from_state(
        state: &PaginationState,
        phase: Phase,
        error_message: Option<String>,
        page_window: u32,
    ) -> Self {
        let (start, end, total) = state.item_span();
        Self {
            phase,
            items: state.items().to_vec(),
            page_range: compute_range(state.current_page(), state.total_pages(), page_window),
            has_next: state.has_next_page(),
            has_previous: state.has_previous_page(),
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            item_span: ItemSpan { start, end, total },
            error_message,
        }
    }
}

/// Receives a fresh view whenever the listing changes phase or content
pub trait Presenter: Send {
    fn on_state_change(&mut self, view: &CatalogView);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn on_state_change(&mut self, view: &CatalogView) {
        (**self).on_state_change(view);
    }
}

/// Presenter that keeps only the most recent view, for UIs that pull
/// state on their own redraw schedule
#[derive(Debug, Default)]
pub struct LatestView {
    view: Option<CatalogView>,
}

impl LatestView {
    pub fn view(&self) -> Option<&CatalogView> {
        self.view.as_ref()
    }
}

impl Presenter for LatestView {
    fn on_state_change(&mut self, view: &CatalogView) {
        self.view = Some(view.clone());
    }
}
