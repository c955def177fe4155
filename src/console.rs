//! Entry point used by presentation code.
//!
//! `SyncConsole` exposes an `open_*` / `close_*` pair per overlay surface and
//! snapshot accessors for rendering. Callers never deal with cache lookups or
//! fetch ordering; every failure ends up in the owning surface's error state.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::cache::Caches;
use crate::config::Config;
use crate::content::ContentRequest;
use crate::diff::{DiffAssembler, DiffKey, DiffPayload};
use crate::fetcher::SignedUrlContentFetcher;
use crate::log_search::{LogBlob, LogView};
use crate::overlay::{
    ContentView, OpenTicket, OverlayStack, SurfaceError, SurfaceKind, SurfaceState,
};
use crate::pagination::{PageError, PageWindow, PagedEventListController};
use crate::sync_client::{PageChange, SyncApi, SyncApiClient, SyncEventDetail, SyncStatus};
use crate::types::ConsoleError;

pub type EventDetailSurface = SurfaceState<String, SyncEventDetail>;
pub type ContentSurface = SurfaceState<crate::content::ContentKey, ContentView>;
pub type DiffSurface = SurfaceState<DiffKey, DiffPayload>;
pub type FullLogSurface = SurfaceState<String, LogView>;

#[derive(Clone)]
pub struct SyncConsole {
    api: Arc<dyn SyncApi>,
    caches: Caches,
    fetcher: SignedUrlContentFetcher,
    diff: DiffAssembler,
    overlays: Arc<Mutex<OverlayStack>>,
    list: Arc<PagedEventListController>,
    export_dir: PathBuf,
}

impl SyncConsole {
    /// Build a console talking to the configured HTTP backend.
    pub fn connect(config: &Config) -> Result<Self, ConsoleError> {
        let client = SyncApiClient::new(config.clone())?;
        Ok(Self::new(Arc::new(client), Caches::new(), config))
    }

    pub fn new(api: Arc<dyn SyncApi>, caches: Caches, config: &Config) -> Self {
        let fetcher = SignedUrlContentFetcher::new(Arc::clone(&api), caches.clone());
        let list = PagedEventListController::new(
            Arc::clone(&api),
            caches.pages.clone(),
            config.page_size,
        );
        Self {
            diff: DiffAssembler::new(fetcher.clone()),
            fetcher,
            list: Arc::new(list),
            overlays: Arc::new(Mutex::new(OverlayStack::new())),
            caches,
            api,
            export_dir: config.export_dir_path(),
        }
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    fn with_overlays<R>(&self, f: impl FnOnce(&mut OverlayStack) -> R) -> R {
        let mut overlays = self.overlays.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut overlays)
    }

    // Event list

    pub async fn load_page(&self, page: u32) -> Result<PageWindow, PageError> {
        self.list.load_page(page).await
    }

    pub async fn refresh_page(&self, page: u32) -> Result<PageWindow, PageError> {
        self.list.refresh_page(page).await
    }

    pub async fn next_page(&self) -> Option<Result<PageWindow, PageError>> {
        self.list.next_page().await
    }

    pub async fn previous_page(&self) -> Option<Result<PageWindow, PageError>> {
        self.list.previous_page().await
    }

    pub fn set_status_filter(&self, status: Option<SyncStatus>) {
        self.list.set_status_filter(status);
    }

    pub fn page_window(&self) -> Option<PageWindow> {
        self.list.current()
    }

    pub fn page_error(&self) -> Option<PageError> {
        self.list.error()
    }

    pub fn page_is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn has_next_page(&self) -> bool {
        self.list.has_next()
    }

    pub fn has_previous_page(&self) -> bool {
        self.list.has_previous()
    }

    // Operational triggers

    pub async fn trigger_sync(&self) -> Result<(), ConsoleError> {
        self.api.trigger_sync().await?;
        info!("Knowledge sync triggered");
        Ok(())
    }

    /// Ask the backend to rebuild its pagination and drop cached pages.
    pub async fn refresh_pagination(&self) -> Result<(), ConsoleError> {
        self.api.refresh_pagination().await?;
        self.list.invalidate_all();
        info!("Pagination refreshed, page cache cleared");
        Ok(())
    }

    // Event detail surface

    pub async fn open_event_details(&self, sync_id: &str) -> EventDetailSurface {
        let sync_id = sync_id.to_string();
        let ticket = self.with_overlays(|o| {
            o.raise(SurfaceKind::EventDetail);
            o.event_detail.begin(sync_id.clone())
        });

        let outcome = match self.caches.details.get(&sync_id) {
            Some(detail) => {
                debug!(sync_id = %sync_id, "Event detail cache hit");
                Ok(detail)
            }
            None => match self.api.fetch_sync_detail(&sync_id).await {
                Ok(detail) => {
                    self.caches.details.put(sync_id.clone(), detail.clone());
                    Ok(detail)
                }
                Err(err) => {
                    warn!(sync_id = %sync_id, error = ?err, "Failed to load sync details");
                    Err(SurfaceError::new(format!("Failed to load sync details: {err}")))
                }
            },
        };

        self.with_overlays(|o| {
            o.event_detail.complete(&ticket, outcome);
            o.event_detail.clone()
        })
    }

    /// Drop the cached detail for `sync_id` and load it again.
    pub async fn refresh_event_details(&self, sync_id: &str) -> EventDetailSurface {
        self.caches.details.invalidate(&sync_id.to_string());
        self.open_event_details(sync_id).await
    }

    pub fn close_event_details(&self) {
        self.with_overlays(|o| o.close(SurfaceKind::EventDetail));
    }

    pub fn event_details(&self) -> EventDetailSurface {
        self.with_overlays(|o| o.event_detail.clone())
    }

    // Raw content surface

    pub async fn open_content(&self, request: ContentRequest) -> ContentSurface {
        let ticket = self.with_overlays(|o| {
            o.raise(SurfaceKind::ContentView);
            o.content_view.begin(request.key())
        });

        let outcome = self
            .fetcher
            .fetch_content(&request)
            .await
            .map(|blob| ContentView {
                request: request.clone(),
                blob,
            })
            .map_err(SurfaceError::from);

        self.with_overlays(|o| {
            o.content_view.complete(&ticket, outcome);
            o.content_view.clone()
        })
    }

    pub fn close_content(&self) {
        self.with_overlays(|o| o.close(SurfaceKind::ContentView));
    }

    pub fn content_view(&self) -> ContentSurface {
        self.with_overlays(|o| o.content_view.clone())
    }

    // Diff surface

    pub async fn open_diff(&self, old: ContentRequest, new: ContentRequest) -> DiffSurface {
        let ticket = self.with_overlays(|o| {
            o.raise(SurfaceKind::Diff);
            o.diff.begin(DiffKey::of(&old, &new))
        });

        let payload = self.diff.assemble(&old, &new).await;

        self.with_overlays(|o| {
            if payload.is_empty() {
                o.diff.complete_with_error(
                    &ticket,
                    payload,
                    SurfaceError::new("Neither version of this content is available"),
                );
            } else {
                o.diff.complete(&ticket, Ok(payload));
            }
            o.diff.clone()
        })
    }

    /// Compare the stored versions of a changed page.
    pub async fn open_change_diff(&self, change: &PageChange) -> DiffSurface {
        self.open_diff(change.old_content(), change.new_content())
            .await
    }

    pub fn close_diff(&self) {
        self.with_overlays(|o| o.close(SurfaceKind::Diff));
    }

    pub fn diff(&self) -> DiffSurface {
        self.with_overlays(|o| o.diff.clone())
    }

    // Full log surface

    /// Open the log for `sync_id`. A cached failure is shown again without a read.
    pub async fn open_full_log(&self, sync_id: &str) -> FullLogSurface {
        let ticket = self.begin_full_log(sync_id);
        let blob = self.fetcher.fetch_log(sync_id).await;
        self.finish_full_log(&ticket, sync_id, blob)
    }

    /// Discard a cached log failure and read the log again.
    pub async fn retry_full_log(&self, sync_id: &str) -> FullLogSurface {
        let ticket = self.begin_full_log(sync_id);
        let blob = self.fetcher.refetch_log(sync_id).await;
        self.finish_full_log(&ticket, sync_id, blob)
    }

    fn begin_full_log(&self, sync_id: &str) -> OpenTicket {
        self.with_overlays(|o| {
            o.raise(SurfaceKind::FullLog);
            o.full_log.begin(sync_id.to_string())
        })
    }

    fn finish_full_log(&self, ticket: &OpenTicket, sync_id: &str, blob: LogBlob) -> FullLogSurface {
        let error = blob.error().cloned();
        let view = LogView::new(sync_id, blob);
        self.with_overlays(|o| {
            match error {
                Some(err) => o.full_log.complete_with_error(ticket, view, err.into()),
                None => o.full_log.complete(ticket, Ok(view)),
            };
            o.full_log.clone()
        })
    }

    /// Update the search term of the open log surface.
    pub fn set_log_search(&self, term: &str) {
        self.with_overlays(|o| {
            if let Some(view) = o.full_log.data.as_mut() {
                view.set_search(term);
            }
        });
    }

    /// Export the full log currently shown to the configured export directory.
    pub async fn export_full_log(&self) -> Result<PathBuf, ConsoleError> {
        let view = self
            .with_overlays(|o| o.full_log.data.clone())
            .ok_or_else(|| ConsoleError::Unavailable("no log is open".to_string()))?;
        view.export(&self.export_dir).await
    }

    pub fn close_full_log(&self) {
        self.with_overlays(|o| o.close(SurfaceKind::FullLog));
    }

    pub fn full_log(&self) -> FullLogSurface {
        self.with_overlays(|o| o.full_log.clone())
    }

    // Stack

    pub fn open_surfaces(&self) -> Vec<SurfaceKind> {
        self.with_overlays(|o| o.open_surfaces().to_vec())
    }

    pub fn close_all(&self) {
        self.with_overlays(|o| o.close_all());
    }
}
