//! Identity and payload types for object-store content.

use serde::Serialize;
use serde_json::Value;

/// What the caller wants to view: a content type plus whatever identifies the object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRequest {
    pub content_type: String,
    pub storage_path: Option<String>,
    pub page_id: Option<String>,
}

/// Cache key for a content blob.
///
/// The storage path wins when present; otherwise the page id stands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentKey {
    pub content_type: String,
    pub identity: String,
}

/// Decoded content of one object-store object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ContentBlob {
    Html(String),
    Text(String),
    Json(Value),
}

impl ContentRequest {
    pub fn new(
        content_type: impl Into<String>,
        storage_path: Option<String>,
        page_id: Option<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            storage_path: storage_path.filter(|path| !path.trim().is_empty()),
            page_id: page_id.filter(|id| !id.trim().is_empty()),
        }
    }

    pub fn for_path(content_type: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self::new(content_type, Some(storage_path.into()), None)
    }

    pub fn key(&self) -> ContentKey {
        let identity = self
            .storage_path
            .clone()
            .or_else(|| self.page_id.as_ref().map(|id| format!("page:{id}")))
            .unwrap_or_default();
        ContentKey {
            content_type: self.content_type.clone(),
            identity,
        }
    }
}

impl ContentBlob {
    /// Decode a fetched body according to the object's path.
    pub fn parse(storage_path: &str, body: String) -> Result<Self, serde_json::Error> {
        let lower = storage_path.to_ascii_lowercase();
        let lower = lower.split(['?', '#']).next().unwrap_or_default();
        if lower.ends_with(".json") {
            return serde_json::from_str(&body).map(ContentBlob::Json);
        }
        if lower.ends_with(".html") || lower.ends_with(".htm") {
            return Ok(ContentBlob::Html(body));
        }
        Ok(ContentBlob::Text(body))
    }

    /// Text form used by the diff and raw content views.
    pub fn display_text(&self) -> String {
        match self {
            ContentBlob::Html(body) | ContentBlob::Text(body) => body.clone(),
            ContentBlob::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}
