use serde::Deserialize;

use crate::sync_client::models::SyncEventSummary;

/// One page of sync runs as returned by the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPageResponse {
    #[serde(default)]
    pub syncs: Vec<SyncEventSummary>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Signed URL descriptor for logs and object-store files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    #[serde(default)]
    pub signed_url: Option<String>,
}

impl SignedUrlResponse {
    /// The URL, ignoring blank values.
    pub fn url(&self) -> Option<&str> {
        self.signed_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_without_total_deserializes() {
        let page: SyncPageResponse = serde_json::from_str(
            r#"{"syncs": [{"syncId": 42, "status": "completed", "endTime": null, "triggerType": "manual"}]}"#,
        )
        .expect("page parses");
        assert_eq!(page.syncs.len(), 1);
        assert_eq!(page.syncs[0].sync_id, "42");
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn blank_signed_url_is_absent() {
        let null: SignedUrlResponse = serde_json::from_str(r#"{"signedUrl": null}"#).expect("parses");
        let blank: SignedUrlResponse = serde_json::from_str(r#"{"signedUrl": "  "}"#).expect("parses");
        assert_eq!(null.url(), None);
        assert_eq!(blank.url(), None);
    }
}
