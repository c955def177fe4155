//! Page-indexed retrieval of sync run summaries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::ResourceCache;
use crate::sync_client::{PageQuery, SyncApi, SyncEventSummary, SyncStatus};

/// Smallest page count reported while more pages are likely.
pub const MIN_ESTIMATED_PAGES: u32 = 5;

/// Estimate the page count when the backend does not report one.
///
/// A full page means more pages probably exist, so the estimate is
/// `max(page + 1, MIN_ESTIMATED_PAGES)`. A short page is taken as the last one.
/// The estimate deliberately errs high so forward navigation is never disabled
/// too early; "Next" may occasionally land on an empty page. Changing this bias
/// changes user-visible navigation behavior.
pub fn estimate_total_pages(requested_page: u32, fetched: usize, page_size: u32) -> u32 {
    let page_is_full = page_size > 0 && fetched >= page_size as usize;
    if page_is_full {
        requested_page.saturating_add(1).max(MIN_ESTIMATED_PAGES)
    } else {
        requested_page
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<SyncStatus>,
}

/// One fetched page plus its pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow {
    pub page: u32,
    pub summaries: Vec<SyncEventSummary>,
    pub total_pages: u32,
    /// False when `total_pages` came from the backend.
    pub total_is_estimate: bool,
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load page {page}: {message}")]
pub struct PageError {
    pub page: u32,
    pub message: String,
}

#[derive(Debug, Default)]
struct ListState {
    status_filter: Option<SyncStatus>,
    current: Option<PageWindow>,
    error: Option<PageError>,
    loading: Option<u32>,
    /// Bumped by every request that changes what the list should show.
    generation: u64,
}

impl ListState {
    fn show(&mut self, window: PageWindow) {
        self.current = Some(window);
        self.error = None;
        self.loading = None;
    }
}

/// Page list state shared between a renderer and navigation actions.
///
/// No lock is held while a page is fetched, so accessors answer immediately.
/// A result is always written to the page cache, but only shown when no newer
/// request was issued while it was in flight.
pub struct PagedEventListController {
    api: Arc<dyn SyncApi>,
    cache: ResourceCache<PageKey, PageWindow>,
    page_size: u32,
    state: Mutex<ListState>,
}

impl PagedEventListController {
    pub fn new(
        api: Arc<dyn SyncApi>,
        cache: ResourceCache<PageKey, PageWindow>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            cache,
            page_size: page_size.max(1),
            state: Mutex::new(ListState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current(&self) -> Option<PageWindow> {
        self.state().current.clone()
    }

    pub fn error(&self) -> Option<PageError> {
        self.state().error.clone()
    }

    pub fn status_filter(&self) -> Option<SyncStatus> {
        self.state().status_filter
    }

    /// True while the page the list is waiting for has not arrived.
    pub fn is_loading(&self) -> bool {
        self.state().loading.is_some()
    }

    pub fn loading_page(&self) -> Option<u32> {
        self.state().loading
    }

    /// Change the status filter. Pages are cached per filter.
    ///
    /// `Unknown` cannot be sent as a filter and is treated as no filter.
    pub fn set_status_filter(&self, status: Option<SyncStatus>) {
        let status = status.filter(|s| s.as_query().is_some());
        let mut state = self.state();
        state.status_filter = status;
        state.current = None;
        state.error = None;
        state.loading = None;
        state.generation += 1;
    }

    pub fn has_next(&self) -> bool {
        self.state().current.as_ref().is_some_and(PageWindow::has_next)
    }

    pub fn has_previous(&self) -> bool {
        self.state()
            .current
            .as_ref()
            .is_some_and(PageWindow::has_previous)
    }

    /// Show page `page`, reading through the page cache.
    pub async fn load_page(&self, page: u32) -> Result<PageWindow, PageError> {
        let (key, generation) = {
            let mut state = self.state();
            let key = self.key(&state, page);
            state.generation += 1;
            if let Some(window) = self.cache.get(&key) {
                debug!(page = key.page, "Page cache hit");
                state.show(window.clone());
                return Ok(window);
            }
            state.loading = Some(key.page);
            (key, state.generation)
        };
        self.fetch(key, generation).await
    }

    /// Re-read page `page` from the backend and replace it wholesale.
    pub async fn refresh_page(&self, page: u32) -> Result<PageWindow, PageError> {
        let (key, generation) = {
            let mut state = self.state();
            let key = self.key(&state, page);
            state.generation += 1;
            state.loading = Some(key.page);
            (key, state.generation)
        };
        self.fetch(key, generation).await
    }

    pub async fn next_page(&self) -> Option<Result<PageWindow, PageError>> {
        let target = {
            let state = self.state();
            let window = state.current.as_ref().filter(|w| w.has_next())?;
            window.page + 1
        };
        Some(self.load_page(target).await)
    }

    pub async fn previous_page(&self) -> Option<Result<PageWindow, PageError>> {
        let target = {
            let state = self.state();
            let window = state.current.as_ref().filter(|w| w.has_previous())?;
            window.page - 1
        };
        Some(self.load_page(target).await)
    }

    /// Forget every cached page; the next load reads the backend.
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    fn key(&self, state: &ListState, page: u32) -> PageKey {
        PageKey {
            page: page.max(1),
            page_size: self.page_size,
            status: state.status_filter,
        }
    }

    async fn fetch(&self, key: PageKey, generation: u64) -> Result<PageWindow, PageError> {
        let page = key.page;
        let query = PageQuery {
            page_size: key.page_size,
            status: key
                .status
                .and_then(|s| s.as_query())
                .map(str::to_string),
        };

        let outcome = match self.api.fetch_sync_page(key.page, &query).await {
            Ok(response) => {
                let (total_pages, total_is_estimate) = match response.total_pages {
                    Some(total) => (total, false),
                    None => (
                        estimate_total_pages(key.page, response.syncs.len(), key.page_size),
                        true,
                    ),
                };
                let window = PageWindow {
                    page: key.page,
                    summaries: response.syncs,
                    total_pages,
                    total_is_estimate,
                };
                info!(
                    page = window.page,
                    count = window.summaries.len(),
                    total_pages,
                    estimated = total_is_estimate,
                    "Loaded sync page"
                );
                self.cache.put(key, window.clone());
                Ok(window)
            }
            Err(err) => {
                warn!(page = key.page, error = ?err, "Failed to load sync page");
                Err(PageError {
                    page: key.page,
                    message: err.to_string(),
                })
            }
        };

        let mut state = self.state();
        if state.generation != generation {
            debug!(page, "Discarding superseded page result");
            return outcome;
        }
        match &outcome {
            Ok(window) => state.show(window.clone()),
            Err(error) => {
                state.error = Some(error.clone());
                state.loading = None;
            }
        }
        outcome
    }
}
