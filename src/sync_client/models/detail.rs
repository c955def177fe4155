use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentRequest;
use crate::sync_client::helpers::deserialize_id;

use super::SyncStatus;

/// Expanded record for a single sync run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncEventDetail {
    #[serde(deserialize_with = "deserialize_id")]
    pub sync_id: String,
    pub status: SyncStatus,
    #[serde(default)]
    pub trigger_type: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages_added: u32,
    #[serde(default)]
    pub pages_updated: u32,
    #[serde(default)]
    pub pages_deleted: u32,
    #[serde(default)]
    pub changes: Vec<PageChange>,
    #[serde(default)]
    pub errors: Vec<SyncErrorRecord>,
}

/// A knowledge-base page touched by a sync run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageChange {
    pub page_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub old_storage_path: Option<String>,
    #[serde(default)]
    pub new_storage_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncErrorRecord {
    #[serde(default)]
    pub page_id: Option<String>,
    pub message: String,
}

fn default_content_type() -> String {
    "html".to_string()
}

impl SyncEventDetail {
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_seconds().max(0)),
            _ => None,
        }
    }

    /// Changes that have both an old and a new stored version.
    pub fn diffable_changes(&self) -> impl Iterator<Item = &PageChange> {
        self.changes.iter().filter(|change| change.is_diffable())
    }
}

impl PageChange {
    pub fn is_diffable(&self) -> bool {
        self.old_storage_path.is_some() && self.new_storage_path.is_some()
    }

    pub fn old_content(&self) -> ContentRequest {
        ContentRequest::new(
            &self.content_type,
            self.old_storage_path.clone(),
            Some(self.page_id.clone()),
        )
    }

    pub fn new_content(&self) -> ContentRequest {
        ContentRequest::new(
            &self.content_type,
            self.new_storage_path.clone(),
            Some(self.page_id.clone()),
        )
    }
}
