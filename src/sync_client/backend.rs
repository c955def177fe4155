use async_trait::async_trait;

use crate::types::ConsoleError;

use super::api::{PageQuery, SignedUrlResponse, SyncPageResponse};
use super::models::SyncEventDetail;

/// Backend endpoints the console reads from.
///
/// [`SyncApiClient`](super::SyncApiClient) talks to the real service; tests
/// substitute an in-memory implementation.
#[async_trait]
pub trait SyncApi: Send + Sync {
    /// `GET /syncs/page/{page}`
    async fn fetch_sync_page(
        &self,
        page: u32,
        query: &PageQuery,
    ) -> Result<SyncPageResponse, ConsoleError>;

    /// `GET /syncs/{sync_id}`
    async fn fetch_sync_detail(&self, sync_id: &str) -> Result<SyncEventDetail, ConsoleError>;

    /// `GET /syncs/{sync_id}/logs`
    async fn resolve_log_url(&self, sync_id: &str) -> Result<SignedUrlResponse, ConsoleError>;

    /// `GET /files?path={storage_path}`
    async fn resolve_file_url(&self, storage_path: &str)
        -> Result<SignedUrlResponse, ConsoleError>;

    /// Plain GET against an already resolved signed URL, returning the body.
    async fn fetch_signed_url(&self, url: &str) -> Result<String, ConsoleError>;

    /// `POST /trigger-sync`
    async fn trigger_sync(&self) -> Result<(), ConsoleError>;

    /// `POST /pagination/refresh`
    async fn refresh_pagination(&self) -> Result<(), ConsoleError>;
}
