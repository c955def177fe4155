use serde::Serialize;

/// Query string for `GET /syncs/page/{n}`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Query string for `GET /files`.
#[derive(Debug, Serialize)]
pub struct FileQuery<'a> {
    pub path: &'a str,
}
