//! Independently lifecycled overlay surfaces.
//!
//! Each surface runs its own `Closed -> Opening -> Open(success | error)`
//! machine. Opening a surface bumps its generation; a fetch result is only
//! applied when it carries the generation that is still current and the
//! surface is still open. Anything else is stale and dropped.

use serde::Serialize;
use tracing::debug;

use crate::content::{ContentBlob, ContentKey, ContentRequest};
use crate::diff::{DiffKey, DiffPayload};
use crate::fetcher::{FetchError, FetchErrorKind};
use crate::log_search::LogView;
use crate::sync_client::SyncEventDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    EventDetail,
    ContentView,
    Diff,
    FullLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    Closed,
    Opening,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub message: String,
    /// Set when the failure came from a signed URL fetch.
    pub kind: Option<FetchErrorKind>,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

impl From<FetchError> for SurfaceError {
    fn from(err: FetchError) -> Self {
        Self {
            message: err.message,
            kind: Some(err.kind),
        }
    }
}

/// Handle tying an in-flight fetch to the surface opening that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTicket {
    pub kind: SurfaceKind,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct SurfaceState<I, T> {
    kind: SurfaceKind,
    pub identity: Option<I>,
    pub is_open: bool,
    pub is_loading: bool,
    pub error: Option<SurfaceError>,
    pub data: Option<T>,
    generation: u64,
}

impl<I, T> SurfaceState<I, T>
where
    I: Clone + PartialEq,
{
    pub fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            identity: None,
            is_open: false,
            is_loading: false,
            error: None,
            data: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn phase(&self) -> SurfacePhase {
        match (self.is_open, self.is_loading, self.error.is_some()) {
            (false, _, _) => SurfacePhase::Closed,
            (true, true, _) => SurfacePhase::Opening,
            (true, false, true) => SurfacePhase::Failed,
            (true, false, false) => SurfacePhase::Ready,
        }
    }

    /// Enter `Opening` for `identity` and return the ticket its fetch must present.
    pub fn begin(&mut self, identity: I) -> OpenTicket {
        self.generation = self.generation.wrapping_add(1);
        self.identity = Some(identity);
        self.is_open = true;
        self.is_loading = true;
        self.error = None;
        self.data = None;
        OpenTicket {
            kind: self.kind,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &OpenTicket) -> bool {
        ticket.kind == self.kind && ticket.generation == self.generation && self.is_open
    }

    /// Apply a fetch outcome. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: &OpenTicket, outcome: Result<T, SurfaceError>) -> bool {
        if !self.is_current(ticket) {
            debug!(kind = ?self.kind, "Discarding stale surface result");
            return false;
        }
        self.is_loading = false;
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                self.data = None;
                self.error = Some(err);
            }
        }
        true
    }

    /// Like [`Self::complete`] but keeps a payload alongside the error.
    pub fn complete_with_error(&mut self, ticket: &OpenTicket, data: T, err: SurfaceError) -> bool {
        if !self.is_current(ticket) {
            debug!(kind = ?self.kind, "Discarding stale surface result");
            return false;
        }
        self.is_loading = false;
        self.data = Some(data);
        self.error = Some(err);
        true
    }

    /// Drop transient view state. Any in-flight fetch becomes stale.
    pub fn close(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.identity = None;
        self.is_open = false;
        self.is_loading = false;
        self.error = None;
        self.data = None;
    }

    pub fn shows(&self, identity: &I) -> bool {
        self.is_open && self.identity.as_ref() == Some(identity)
    }
}

/// Payload of the raw content surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentView {
    pub request: ContentRequest,
    pub blob: ContentBlob,
}

/// All overlay surfaces, open ones stacked in the order they were opened.
#[derive(Debug, Clone)]
pub struct OverlayStack {
    pub event_detail: SurfaceState<String, SyncEventDetail>,
    pub content_view: SurfaceState<ContentKey, ContentView>,
    pub diff: SurfaceState<DiffKey, DiffPayload>,
    pub full_log: SurfaceState<String, LogView>,
    order: Vec<SurfaceKind>,
}

impl Default for OverlayStack {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayStack {
    pub fn new() -> Self {
        Self {
            event_detail: SurfaceState::new(SurfaceKind::EventDetail),
            content_view: SurfaceState::new(SurfaceKind::ContentView),
            diff: SurfaceState::new(SurfaceKind::Diff),
            full_log: SurfaceState::new(SurfaceKind::FullLog),
            order: Vec::new(),
        }
    }

    /// Move `kind` to the top of the stack.
    pub fn raise(&mut self, kind: SurfaceKind) {
        self.order.retain(|k| *k != kind);
        self.order.push(kind);
    }

    pub fn close(&mut self, kind: SurfaceKind) {
        match kind {
            SurfaceKind::EventDetail => self.event_detail.close(),
            SurfaceKind::ContentView => self.content_view.close(),
            SurfaceKind::Diff => self.diff.close(),
            SurfaceKind::FullLog => self.full_log.close(),
        }
        self.order.retain(|k| *k != kind);
    }

    pub fn close_all(&mut self) {
        for kind in self.order.clone() {
            self.close(kind);
        }
    }

    /// Open surfaces, bottom first.
    pub fn open_surfaces(&self) -> &[SurfaceKind] {
        &self.order
    }

    pub fn top(&self) -> Option<SurfaceKind> {
        self.order.last().copied()
    }

    pub fn is_open(&self, kind: SurfaceKind) -> bool {
        self.order.contains(&kind)
    }
}
