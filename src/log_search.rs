//! Line filtering and export over a fetched sync log.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::fetcher::FetchError;
use crate::sync_client::export_file_name;
use crate::types::ConsoleError;

/// Cached state of one sync log: the text, or the error that prevented reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogBlob {
    Loaded(String),
    Failed(FetchError),
}

impl LogBlob {
    pub fn is_failed(&self) -> bool {
        matches!(self, LogBlob::Failed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            LogBlob::Loaded(text) => Some(text),
            LogBlob::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LogBlob::Loaded(_) => None,
            LogBlob::Failed(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    /// 1-based position in the original log.
    pub number: usize,
    pub text: String,
}

/// Lines of `blob` containing `term`, case-insensitively, in original order.
///
/// The term is matched as typed, surrounding spaces included. An empty term
/// keeps every line. A failed blob has no lines.
pub fn filter_lines(blob: &LogBlob, term: &str) -> Vec<LogLine> {
    let Some(text) = blob.text() else {
        return Vec::new();
    };
    let needle = term.to_lowercase();

    text.lines()
        .enumerate()
        .filter(|(_, line)| needle.is_empty() || line.to_lowercase().contains(&needle))
        .map(|(idx, line)| LogLine {
            number: idx + 1,
            text: line.to_string(),
        })
        .collect()
}

/// Write the complete log, never a filtered subset, to `dir`.
pub async fn export_log(
    blob: &LogBlob,
    sync_id: &str,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ConsoleError> {
    let text = match blob {
        LogBlob::Loaded(text) => text,
        LogBlob::Failed(err) => {
            return Err(ConsoleError::Unavailable(format!(
                "log for sync {sync_id} cannot be exported: {err}"
            )))
        }
    };

    fs::create_dir_all(dir).await?;
    let path = dir.join(export_file_name(sync_id, date));
    fs::write(&path, text).await?;
    info!(sync_id, path = %path.display(), bytes = text.len(), "Exported sync log");
    Ok(path)
}

/// Search state for the full-log surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogView {
    pub sync_id: String,
    pub blob: LogBlob,
    pub search_term: String,
}

impl LogView {
    pub fn new(sync_id: impl Into<String>, blob: LogBlob) -> Self {
        Self {
            sync_id: sync_id.into(),
            blob,
            search_term: String::new(),
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn visible_lines(&self) -> Vec<LogLine> {
        filter_lines(&self.blob, &self.search_term)
    }

    pub fn total_lines(&self) -> usize {
        self.blob.text().map(|text| text.lines().count()).unwrap_or(0)
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.blob.error()
    }

    /// Export the full log, stamped with today's local date.
    pub async fn export(&self, dir: &Path) -> Result<PathBuf, ConsoleError> {
        export_log(&self.blob, &self.sync_id, dir, Local::now().date_naive()).await
    }
}
