mod api;
mod backend;
mod client;
mod helpers;
mod models;

pub use api::{PageQuery, SignedUrlResponse, SyncPageResponse};
pub use backend::SyncApi;
pub use client::SyncApiClient;
pub use helpers::{export_file_name, format_relative_time};
pub use models::{PageChange, SyncErrorRecord, SyncEventDetail, SyncEventSummary, SyncStatus};
