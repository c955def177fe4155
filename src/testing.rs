//! In-memory backend used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::sync_client::{
    PageQuery, SignedUrlResponse, SyncApi, SyncEventDetail, SyncEventSummary, SyncPageResponse,
    SyncStatus,
};
use crate::types::ConsoleError;

#[derive(Default)]
struct Counters {
    pages: AtomicUsize,
    details: AtomicUsize,
    log_resolves: AtomicUsize,
    file_resolves: AtomicUsize,
    signed_fetches: AtomicUsize,
    triggers: AtomicUsize,
    refreshes: AtomicUsize,
}

#[derive(Default)]
pub struct MockApi {
    pages: Mutex<HashMap<u32, Result<SyncPageResponse, u16>>>,
    details: Mutex<HashMap<String, SyncEventDetail>>,
    log_urls: Mutex<HashMap<String, Option<String>>>,
    file_urls: Mutex<HashMap<String, Option<String>>>,
    objects: Mutex<HashMap<String, Result<String, u16>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    counters: Counters,
}

pub fn summary(id: &str) -> SyncEventSummary {
    SyncEventSummary {
        sync_id: id.to_string(),
        status: SyncStatus::Completed,
        end_time: None,
        trigger_type: "schedule".to_string(),
    }
}

pub fn detail(id: &str) -> SyncEventDetail {
    SyncEventDetail {
        sync_id: id.to_string(),
        status: SyncStatus::Completed,
        trigger_type: "manual".to_string(),
        start_time: None,
        end_time: None,
        pages_added: 0,
        pages_updated: 1,
        pages_deleted: 0,
        changes: Vec::new(),
        errors: Vec::new(),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, page: u32, count: usize, total_pages: Option<u32>) {
        let syncs = (0..count)
            .map(|i| summary(&format!("{page}-{i}")))
            .collect();
        self.pages
            .lock()
            .unwrap()
            .insert(page, Ok(SyncPageResponse { syncs, total_pages }));
    }

    pub fn fail_page(&self, page: u32, status: u16) {
        self.pages.lock().unwrap().insert(page, Err(status));
    }

    pub fn add_detail(&self, detail: SyncEventDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.sync_id.clone(), detail);
    }

    pub fn add_file(&self, path: &str, body: &str) {
        self.add_object(path, Ok(body.to_string()));
    }

    pub fn add_file_with_status(&self, path: &str, status: u16) {
        self.add_object(path, Err(status));
    }

    fn add_object(&self, path: &str, object: Result<String, u16>) {
        let url = format!("https://store.test/{path}?sig=1");
        self.file_urls
            .lock()
            .unwrap()
            .insert(path.to_string(), Some(url.clone()));
        self.objects.lock().unwrap().insert(url, object);
    }

    pub fn add_log(&self, sync_id: &str, body: &str) {
        self.add_log_object(sync_id, Ok(body.to_string()));
    }

    pub fn add_log_with_status(&self, sync_id: &str, status: u16) {
        self.add_log_object(sync_id, Err(status));
    }

    fn add_log_object(&self, sync_id: &str, object: Result<String, u16>) {
        let url = format!("https://store.test/logs/{sync_id}.log?sig=1");
        self.set_log_url(sync_id, Some(url.clone()));
        self.objects.lock().unwrap().insert(url, object);
    }

    pub fn set_log_url(&self, sync_id: &str, url: Option<String>) {
        self.log_urls
            .lock()
            .unwrap()
            .insert(sync_id.to_string(), url);
    }

    /// Hold the next response for `key` until the returned handle is notified.
    ///
    /// The response is decided when the call arrives, before it waits, and the
    /// gate only applies to that one call.
    ///
    /// Keys: `page:{n}`, `detail:{id}`, `log:{id}`, `file:{path}`.
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::clone(&gate));
        gate
    }

    async fn wait_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().remove(key);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn page_fetches(&self) -> usize {
        self.counters.pages.load(Ordering::SeqCst)
    }

    pub fn detail_fetches(&self) -> usize {
        self.counters.details.load(Ordering::SeqCst)
    }

    pub fn log_resolves(&self) -> usize {
        self.counters.log_resolves.load(Ordering::SeqCst)
    }

    pub fn file_resolves(&self) -> usize {
        self.counters.file_resolves.load(Ordering::SeqCst)
    }

    pub fn signed_fetches(&self) -> usize {
        self.counters.signed_fetches.load(Ordering::SeqCst)
    }

    pub fn triggers(&self) -> usize {
        self.counters.triggers.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.counters.refreshes.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.page_fetches()
            + self.detail_fetches()
            + self.log_resolves()
            + self.file_resolves()
            + self.signed_fetches()
    }
}

#[async_trait]
impl SyncApi for MockApi {
    async fn fetch_sync_page(
        &self,
        page: u32,
        _query: &PageQuery,
    ) -> Result<SyncPageResponse, ConsoleError> {
        self.counters.pages.fetch_add(1, Ordering::SeqCst);
        let entry = self.pages.lock().unwrap().get(&page).cloned();
        self.wait_gate(&format!("page:{page}")).await;
        match entry {
            Some(Ok(response)) => Ok(response),
            Some(Err(status)) => Err(ConsoleError::api(format!("/syncs/page/{page}"), status, "failed")),
            None => Ok(SyncPageResponse::default()),
        }
    }

    async fn fetch_sync_detail(&self, sync_id: &str) -> Result<SyncEventDetail, ConsoleError> {
        self.counters.details.fetch_add(1, Ordering::SeqCst);
        let entry = self.details.lock().unwrap().get(sync_id).cloned();
        self.wait_gate(&format!("detail:{sync_id}")).await;
        entry.ok_or_else(|| ConsoleError::api(format!("/syncs/{sync_id}"), 404, "not found"))
    }

    async fn resolve_log_url(&self, sync_id: &str) -> Result<SignedUrlResponse, ConsoleError> {
        self.counters.log_resolves.fetch_add(1, Ordering::SeqCst);
        let entry = self.log_urls.lock().unwrap().get(sync_id).cloned();
        self.wait_gate(&format!("log:{sync_id}")).await;
        match entry {
            Some(signed_url) => Ok(SignedUrlResponse { signed_url }),
            None => Err(ConsoleError::api(format!("/syncs/{sync_id}/logs"), 404, "not found")),
        }
    }

    async fn resolve_file_url(
        &self,
        storage_path: &str,
    ) -> Result<SignedUrlResponse, ConsoleError> {
        self.counters.file_resolves.fetch_add(1, Ordering::SeqCst);
        let entry = self.file_urls.lock().unwrap().get(storage_path).cloned();
        self.wait_gate(&format!("file:{storage_path}")).await;
        match entry {
            Some(signed_url) => Ok(SignedUrlResponse { signed_url }),
            None => Err(ConsoleError::api("/files", 404, "not found")),
        }
    }

    async fn fetch_signed_url(&self, url: &str) -> Result<String, ConsoleError> {
        self.counters.signed_fetches.fetch_add(1, Ordering::SeqCst);
        let entry = self.objects.lock().unwrap().get(url).cloned();
        match entry {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(ConsoleError::api("signed URL", status, "AccessDenied")),
            None => Err(ConsoleError::api("signed URL", 404, "NoSuchKey")),
        }
    }

    async fn trigger_sync(&self) -> Result<(), ConsoleError> {
        self.counters.triggers.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh_pagination(&self) -> Result<(), ConsoleError> {
        self.counters.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
