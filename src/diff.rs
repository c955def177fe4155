//! Two-sided content retrieval for the diff surface.

use thiserror::Error;
use tracing::{debug, warn};

use crate::content::{ContentBlob, ContentKey, ContentRequest};
use crate::fetcher::{FetchError, SignedUrlContentFetcher};

pub const CONTENT_NOT_AVAILABLE: &str = "Content not available";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiffKey {
    pub old: ContentKey,
    pub new: ContentKey,
}

impl DiffKey {
    pub fn of(old: &ContentRequest, new: &ContentRequest) -> Self {
        Self {
            old: old.key(),
            new: new.key(),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffSide {
    pub request: ContentRequest,
    pub content: Option<ContentBlob>,
    pub error: Option<FetchError>,
}

impl DiffSide {
    fn from_outcome(request: &ContentRequest, outcome: Result<ContentBlob, FetchError>) -> Self {
        let (content, error) = match outcome {
            Ok(blob) => (Some(blob), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            request: request.clone(),
            content,
            error,
        }
    }

    /// Text to render; falls back to a placeholder when the side failed.
    pub fn text(&self) -> String {
        self.content
            .as_ref()
            .map(ContentBlob::display_text)
            .unwrap_or_else(|| CONTENT_NOT_AVAILABLE.to_string())
    }

    pub fn is_available(&self) -> bool {
        self.content.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffPayload {
    pub old: DiffSide,
    pub new: DiffSide,
}

/// One side of the comparison could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{side} content unavailable: {source}")]
pub struct PartialAssemblyError {
    pub side: &'static str,
    pub source: FetchError,
}

impl DiffPayload {
    pub fn is_complete(&self) -> bool {
        self.old.is_available() && self.new.is_available()
    }

    pub fn is_empty(&self) -> bool {
        !self.old.is_available() && !self.new.is_available()
    }

    /// Failures of individual sides, old side first.
    pub fn partial_errors(&self) -> Vec<PartialAssemblyError> {
        [("old", &self.old), ("new", &self.new)]
            .into_iter()
            .filter_map(|(side, diff_side)| {
                diff_side.error.clone().map(|source| PartialAssemblyError { side, source })
            })
            .collect()
    }
}

/// Fetches the old and new sides of a diff, skipping whatever is cached.
#[derive(Clone)]
pub struct DiffAssembler {
    fetcher: SignedUrlContentFetcher,
}

impl DiffAssembler {
    pub fn new(fetcher: SignedUrlContentFetcher) -> Self {
        Self { fetcher }
    }

    /// Number of sides that would need a network fetch right now.
    pub fn pending_fetches(&self, old: &ContentRequest, new: &ContentRequest) -> usize {
        let old_missing = self.fetcher.cached_content(old).is_none();
        if old.key() == new.key() {
            return usize::from(old_missing);
        }
        let new_missing = self.fetcher.cached_content(new).is_none();
        usize::from(old_missing) + usize::from(new_missing)
    }

    /// Fetch both sides concurrently; a failing side does not abort the other.
    pub async fn assemble(&self, old: &ContentRequest, new: &ContentRequest) -> DiffPayload {
        debug!(
            old = %old.key().identity,
            new = %new.key().identity,
            pending = self.pending_fetches(old, new),
            "Assembling diff"
        );

        let (old_outcome, new_outcome) = if old.key() == new.key() {
            let outcome = self.fetcher.fetch_content(old).await;
            (outcome.clone(), outcome)
        } else {
            tokio::join!(
                self.fetcher.fetch_content(old),
                self.fetcher.fetch_content(new)
            )
        };

        let payload = DiffPayload {
            old: DiffSide::from_outcome(old, old_outcome),
            new: DiffSide::from_outcome(new, new_outcome),
        };
        for err in payload.partial_errors() {
            warn!(side = err.side, kind = %err.source.kind, error = %err.source, "Diff side unavailable");
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::Caches;
    use crate::sync_client::SyncApi;
    use crate::testing::MockApi;

    fn assembler(api: &Arc<MockApi>, caches: &Caches) -> DiffAssembler {
        let api: Arc<dyn SyncApi> = api.clone();
        DiffAssembler::new(SignedUrlContentFetcher::new(api, caches.clone()))
    }

    fn old_rev() -> ContentRequest {
        ContentRequest::for_path("html", "kb/p1/v1.html")
    }

    fn new_rev() -> ContentRequest {
        ContentRequest::for_path("html", "kb/p1/v2.html")
    }

    #[tokio::test]
    async fn both_cached_means_no_network() {
        let api = Arc::new(MockApi::new());
        let caches = Caches::new();
        caches.content.put(old_rev().key(), ContentBlob::Html("a".into()));
        caches.content.put(new_rev().key(), ContentBlob::Html("b".into()));
        let diff = assembler(&api, &caches);

        assert_eq!(diff.pending_fetches(&old_rev(), &new_rev()), 0);
        let payload = diff.assemble(&old_rev(), &new_rev()).await;
        assert!(payload.is_complete());
        assert_eq!(payload.old.text(), "a");
        assert_eq!(payload.new.text(), "b");
        assert_eq!(api.network_calls(), 0);
    }

    #[tokio::test]
    async fn one_cached_side_fetches_only_the_other() {
        let api = Arc::new(MockApi::new());
        api.add_file("kb/p1/v2.html", "b");
        let caches = Caches::new();
        caches.content.put(old_rev().key(), ContentBlob::Html("a".into()));
        let diff = assembler(&api, &caches);

        assert_eq!(diff.pending_fetches(&old_rev(), &new_rev()), 1);
        let payload = diff.assemble(&old_rev(), &new_rev()).await;
        assert!(payload.is_complete());
        assert_eq!(api.file_resolves(), 1);
        assert_eq!(api.signed_fetches(), 1);
    }

    #[tokio::test]
    async fn failed_side_renders_placeholder_and_keeps_the_other() {
        let api = Arc::new(MockApi::new());
        api.add_file("kb/p1/v1.html", "old body");
        api.add_file_with_status("kb/p1/v2.html", 403);
        let caches = Caches::new();
        let diff = assembler(&api, &caches);

        let payload = diff.assemble(&old_rev(), &new_rev()).await;
        assert_eq!(payload.old.text(), "old body");
        assert_eq!(payload.new.text(), CONTENT_NOT_AVAILABLE);
        let errors = payload.partial_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].side, "new");
        assert!(errors[0].source.is_transport());
        assert!(caches.content.contains(&old_rev().key()));
        assert!(!caches.content.contains(&new_rev().key()));
    }

    #[tokio::test]
    async fn identical_sides_are_fetched_once() {
        let api = Arc::new(MockApi::new());
        api.add_file("kb/p1/v1.html", "same");
        let caches = Caches::new();
        let diff = assembler(&api, &caches);

        let payload = diff.assemble(&old_rev(), &old_rev()).await;
        assert_eq!(payload.old.text(), payload.new.text());
        assert_eq!(api.signed_fetches(), 1);
    }
}
