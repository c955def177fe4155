mod detail;
mod summary;

pub use detail::{PageChange, SyncErrorRecord, SyncEventDetail};
pub use summary::{SyncEventSummary, SyncStatus};
