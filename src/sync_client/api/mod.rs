mod queries;
mod responses;

pub use queries::{FileQuery, PageQuery};
pub use responses::{SignedUrlResponse, SyncPageResponse};
