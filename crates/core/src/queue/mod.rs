//! Download queue: per-scene download tracking with a bounded retry
//! policy for failed client submissions.

pub mod manager;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use manager::{DownloadQueue, RetryOutcome};
pub use sqlite_store::SqliteQueueStore;
pub use store::QueueStore;
pub use types::{
    AcceptRequest, DownloadQueueItem, DownloadStatus, QueueError, RetryPolicy, RetryState,
};
