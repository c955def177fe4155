use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sync_console::sync_client::{PageQuery, SignedUrlResponse, SyncPageResponse};
use sync_console::{
    Caches, Config, ConsoleError, SyncApi, SyncConsole, SyncEventDetail, SyncEventSummary,
    SyncStatus,
};

/// Scripted backend recording every call it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    pub pages: Mutex<HashMap<u32, SyncPageResponse>>,
    pub details: Mutex<HashMap<String, SyncEventDetail>>,
    pub signed_urls: Mutex<HashMap<String, Option<String>>>,
    pub objects: Mutex<HashMap<String, Result<String, u16>>>,
    pub calls: Mutex<Vec<String>>,
    resolves: AtomicUsize,
    transports: AtomicUsize,
}

impl ScriptedBackend {
    pub fn page(&self, page: u32, count: usize, total_pages: Option<u32>) {
        let syncs = (0..count)
            .map(|i| SyncEventSummary {
                sync_id: format!("{page}-{i}"),
                status: SyncStatus::Completed,
                end_time: None,
                trigger_type: "schedule".to_string(),
            })
            .collect();
        self.pages
            .lock()
            .unwrap()
            .insert(page, SyncPageResponse { syncs, total_pages });
    }

    pub fn detail(&self, detail: SyncEventDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.sync_id.clone(), detail);
    }

    /// Register `target` (`log:{id}` or `file:{path}`) behind a signed URL.
    pub fn object(&self, target: &str, payload: Result<&str, u16>) {
        let url = format!("https://bucket.test/{target}?X-Amz-Signature=abc");
        self.signed_urls
            .lock()
            .unwrap()
            .insert(target.to_string(), Some(url.clone()));
        self.objects
            .lock()
            .unwrap()
            .insert(url, payload.map(str::to_string));
    }

    pub fn unresolvable(&self, target: &str) {
        self.signed_urls
            .lock()
            .unwrap()
            .insert(target.to_string(), None);
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    pub fn transports(&self) -> usize {
        self.transports.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn resolve(&self, target: &str) -> Result<SignedUrlResponse, ConsoleError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.record(format!("resolve {target}"));
        match self.signed_urls.lock().unwrap().get(target) {
            Some(signed_url) => Ok(SignedUrlResponse {
                signed_url: signed_url.clone(),
            }),
            None => Err(ConsoleError::api(target, 404, "not found")),
        }
    }
}

#[async_trait]
impl SyncApi for ScriptedBackend {
    async fn fetch_sync_page(
        &self,
        page: u32,
        query: &PageQuery,
    ) -> Result<SyncPageResponse, ConsoleError> {
        self.record(format!("page {page} size {}", query.page_size));
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_sync_detail(&self, sync_id: &str) -> Result<SyncEventDetail, ConsoleError> {
        self.record(format!("detail {sync_id}"));
        self.details
            .lock()
            .unwrap()
            .get(sync_id)
            .cloned()
            .ok_or_else(|| ConsoleError::api(format!("/syncs/{sync_id}"), 404, "not found"))
    }

    async fn resolve_log_url(&self, sync_id: &str) -> Result<SignedUrlResponse, ConsoleError> {
        self.resolve(&format!("log:{sync_id}"))
    }

    async fn resolve_file_url(
        &self,
        storage_path: &str,
    ) -> Result<SignedUrlResponse, ConsoleError> {
        self.resolve(&format!("file:{storage_path}"))
    }

    async fn fetch_signed_url(&self, url: &str) -> Result<String, ConsoleError> {
        self.transports.fetch_add(1, Ordering::SeqCst);
        self.record(format!("GET {url}"));
        match self.objects.lock().unwrap().get(url).cloned() {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(ConsoleError::api("signed URL", status, "AccessDenied")),
            None => Err(ConsoleError::api("signed URL", 404, "NoSuchKey")),
        }
    }

    async fn trigger_sync(&self) -> Result<(), ConsoleError> {
        self.record("trigger".to_string());
        Ok(())
    }

    async fn refresh_pagination(&self) -> Result<(), ConsoleError> {
        self.record("refresh".to_string());
        Ok(())
    }
}

pub fn console(backend: &Arc<ScriptedBackend>, config: &Config) -> SyncConsole {
    let api: Arc<dyn SyncApi> = backend.clone();
    SyncConsole::new(api, Caches::new(), config)
}
