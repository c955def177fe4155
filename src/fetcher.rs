//! Two-phase retrieval of object-store payloads through signed URLs.
//!
//! Phase one asks the backend for a signed URL, phase two reads the payload
//! directly from the object store. The two phases fail differently and the
//! error kind records which one broke.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::Caches;
use crate::content::{ContentBlob, ContentRequest};
use crate::log_search::LogBlob;
use crate::sync_client::SyncApi;
use crate::types::ConsoleError;

const CORS_HINT: &str = "The storage bucket may be blocking cross-origin requests (CORS) \
     or the signed URL may have expired.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The backend could not produce a usable signed URL.
    Resolution,
    /// The signed URL was resolved but reading from it failed.
    Transport,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Resolution => f.write_str("resolution"),
            FetchErrorKind::Transport => f.write_str("transport"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl FetchError {
    pub fn resolution(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Resolution,
            message: message.into(),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            status,
        }
    }

    fn from_resolve(what: &str, err: &ConsoleError) -> Self {
        Self {
            kind: FetchErrorKind::Resolution,
            message: format!("Failed to resolve {what} URL: {err}"),
            status: err.status_code(),
        }
    }

    fn from_transport(what: &str, err: &ConsoleError) -> Self {
        let status = err.status_code();
        let message = match status {
            Some(code) => format!("Failed to fetch {what} (HTTP {code}). {CORS_HINT}"),
            None => format!("Failed to fetch {what}: {err}. {CORS_HINT}"),
        };
        Self::transport(message, status)
    }

    pub fn is_resolution(&self) -> bool {
        self.kind == FetchErrorKind::Resolution
    }

    pub fn is_transport(&self) -> bool {
        self.kind == FetchErrorKind::Transport
    }
}

/// Cache-first fetcher for content blobs and sync logs.
#[derive(Clone)]
pub struct SignedUrlContentFetcher {
    api: Arc<dyn SyncApi>,
    caches: Caches,
}

impl SignedUrlContentFetcher {
    pub fn new(api: Arc<dyn SyncApi>, caches: Caches) -> Self {
        Self { api, caches }
    }

    pub fn cached_content(&self, request: &ContentRequest) -> Option<ContentBlob> {
        self.caches.content.get(&request.key())
    }

    /// Return the content for `request`, reading through the content cache.
    ///
    /// Only successful payloads are cached.
    pub async fn fetch_content(&self, request: &ContentRequest) -> Result<ContentBlob, FetchError> {
        let key = request.key();
        if let Some(blob) = self.caches.content.get(&key) {
            debug!(identity = %key.identity, "Content cache hit");
            return Ok(blob);
        }

        let Some(storage_path) = request.storage_path.as_deref() else {
            return Err(FetchError::resolution(
                "Storage path not available for this content",
            ));
        };

        let descriptor = self
            .api
            .resolve_file_url(storage_path)
            .await
            .map_err(|err| {
                warn!(path = %storage_path, error = ?err, "File URL resolution failed");
                FetchError::from_resolve("file", &err)
            })?;
        let url = descriptor
            .url()
            .ok_or_else(|| FetchError::resolution("File URL not available"))?;

        let body = self.api.fetch_signed_url(url).await.map_err(|err| {
            warn!(path = %storage_path, error = ?err, "Content fetch failed");
            FetchError::from_transport("file content", &err)
        })?;

        let blob = ContentBlob::parse(storage_path, body).map_err(|err| {
            FetchError::transport(format!("Failed to decode {storage_path}: {err}"), None)
        })?;

        info!(path = %storage_path, "Fetched content");
        self.caches.content.put(key, blob.clone());
        Ok(blob)
    }

    /// Return the log for `sync_id`.
    ///
    /// Failures are cached as [`LogBlob::Failed`] so reopening re-renders the
    /// error without another read; use [`Self::refetch_log`] to retry.
    pub async fn fetch_log(&self, sync_id: &str) -> LogBlob {
        if let Some(blob) = self.caches.logs.get(&sync_id.to_string()) {
            debug!(sync_id, "Log cache hit");
            return blob;
        }

        match self.download_log(sync_id).await {
            Ok(text) => {
                info!(sync_id, bytes = text.len(), "Fetched sync log");
                let blob = LogBlob::Loaded(text);
                self.caches.logs.put(sync_id.to_string(), blob.clone());
                blob
            }
            Err(err) => {
                warn!(sync_id, kind = %err.kind, error = %err, "Sync log unavailable");
                // A concurrent read may have cached the log meanwhile; keep it.
                let kept = self
                    .caches
                    .logs
                    .put_if_absent(sync_id.to_string(), LogBlob::Failed(err));
                if !kept.is_failed() {
                    debug!(sync_id, "Dropping failure superseded by a loaded log");
                }
                kept
            }
        }
    }

    /// Drop any cached log state for `sync_id` and read it again.
    ///
    /// This is the only path that clears a log entry.
    pub async fn refetch_log(&self, sync_id: &str) -> LogBlob {
        self.caches.logs.invalidate(&sync_id.to_string());
        self.fetch_log(sync_id).await
    }

    async fn download_log(&self, sync_id: &str) -> Result<String, FetchError> {
        let descriptor = self
            .api
            .resolve_log_url(sync_id)
            .await
            .map_err(|err| FetchError::from_resolve("log file", &err))?;
        let url = descriptor
            .url()
            .ok_or_else(|| FetchError::resolution("Log file URL not available"))?;

        self.api
            .fetch_signed_url(url)
            .await
            .map_err(|err| FetchError::from_transport("log file", &err))
    }
}
