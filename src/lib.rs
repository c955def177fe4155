//! Cache and overlay orchestration for the knowledge-sync operation viewer.

pub mod cache;
pub mod config;
pub mod console;
pub mod content;
pub mod diff;
pub mod fetcher;
pub mod log_search;
pub mod overlay;
pub mod pagination;
pub mod sync_client;
pub mod types;

#[cfg(test)]
mod testing;

pub use cache::{Caches, ResourceCache};
pub use config::Config;
pub use console::SyncConsole;
pub use content::{ContentBlob, ContentKey, ContentRequest};
pub use diff::{DiffAssembler, DiffPayload, DiffSide, PartialAssemblyError};
pub use fetcher::{FetchError, FetchErrorKind, SignedUrlContentFetcher};
pub use log_search::{filter_lines, LogBlob, LogLine, LogView};
pub use overlay::{OverlayStack, SurfaceError, SurfaceKind, SurfacePhase, SurfaceState};
pub use pagination::{estimate_total_pages, PageError, PageWindow, PagedEventListController};
pub use sync_client::{
    PageChange, SyncApi, SyncApiClient, SyncErrorRecord, SyncEventDetail, SyncEventSummary,
    SyncStatus,
};
pub use types::ConsoleError;
