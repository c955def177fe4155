use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync_client::helpers::{deserialize_id, format_relative_time};

/// Lifecycle state of one knowledge-sync run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Completed,
    CompletedWithErrors,
    Failure,
    InProgress,
    #[serde(other)]
    Unknown,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Completed => "Completed",
            SyncStatus::CompletedWithErrors => "Completed with errors",
            SyncStatus::Failure => "Failed",
            SyncStatus::InProgress => "In progress",
            SyncStatus::Unknown => "Unknown",
        }
    }

    /// Wire value used by the list endpoint's `status` filter.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            SyncStatus::Completed => Some("completed"),
            SyncStatus::CompletedWithErrors => Some("completed_with_errors"),
            SyncStatus::Failure => Some("failure"),
            SyncStatus::InProgress => Some("in_progress"),
            SyncStatus::Unknown => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncStatus::InProgress)
    }
}

/// One sync run as listed on an event page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncEventSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub sync_id: String,
    pub status: SyncStatus,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trigger_type: String,
}

impl SyncEventSummary {
    /// Relative end time for list rendering; in-flight runs have none.
    pub fn ended_ago(&self, now: DateTime<Utc>) -> String {
        match self.end_time {
            Some(end) => format_relative_time(end, now),
            None if !self.status.is_terminal() => "running".to_string(),
            None => "-".to_string(),
        }
    }
}
