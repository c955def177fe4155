use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::ConsoleError;

use super::api::{FileQuery, PageQuery, SignedUrlResponse, SyncPageResponse};
use super::backend::SyncApi;
use super::models::SyncEventDetail;

const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Clone)]
pub struct SyncApiClient {
    http: Client,
    config: Config,
}

impl SyncApiClient {
    /// Prepare an HTTP client against the configured API base URL.
    pub fn new(config: Config) -> Result<Self, ConsoleError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(ConsoleError::Http)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ConsoleError>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_query(path, &()).await
    }

    async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ConsoleError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ConsoleError::Http)?;

        let response = ensure_success(path, response).await?;
        response.json::<T>().await.map_err(ConsoleError::Http)
    }

    async fn post_empty(&self, path: &str) -> Result<(), ConsoleError> {
        let url = self.config.endpoint(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(ConsoleError::Http)?;
        ensure_success(path, response).await?;
        Ok(())
    }
}

#[async_trait]
impl SyncApi for SyncApiClient {
    async fn fetch_sync_page(
        &self,
        page: u32,
        query: &PageQuery,
    ) -> Result<SyncPageResponse, ConsoleError> {
        self.get_json_with_query(&format!("/syncs/page/{page}"), query)
            .await
    }

    async fn fetch_sync_detail(&self, sync_id: &str) -> Result<SyncEventDetail, ConsoleError> {
        self.get_json(&sync_path(sync_id, "")).await
    }

    async fn resolve_log_url(&self, sync_id: &str) -> Result<SignedUrlResponse, ConsoleError> {
        self.get_json(&sync_path(sync_id, "/logs")).await
    }

    async fn resolve_file_url(
        &self,
        storage_path: &str,
    ) -> Result<SignedUrlResponse, ConsoleError> {
        let query = FileQuery { path: storage_path };
        self.get_json_with_query("/files", &query).await
    }

    async fn fetch_signed_url(&self, url: &str) -> Result<String, ConsoleError> {
        // Signed URLs carry their own credentials; no API headers here.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ConsoleError::Http)?;
        let response = ensure_success("signed URL", response).await?;
        response.text().await.map_err(ConsoleError::Http)
    }

    async fn trigger_sync(&self) -> Result<(), ConsoleError> {
        self.post_empty("/trigger-sync").await
    }

    async fn refresh_pagination(&self) -> Result<(), ConsoleError> {
        self.post_empty("/pagination/refresh").await
    }
}

/// Path of one sync run; the id is opaque and encoded as a single segment.
fn sync_path(sync_id: &str, suffix: &str) -> String {
    format!("/syncs/{}{suffix}", urlencoding::encode(sync_id))
}

async fn ensure_success(path: &str, response: Response) -> Result<Response, ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let mut preview: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        preview.push_str("...");
    }
    warn!(path, status = status.as_u16(), "Request failed");
    Err(ConsoleError::api(
        path,
        status.as_u16(),
        if preview.is_empty() {
            status.to_string()
        } else {
            preview
        },
    ))
}
