//! Queue store trait.

use super::types::{AcceptRequest, DownloadQueueItem, DownloadStatus, QueueError, RetryPolicy};

/// Persistent storage for the download queue.
///
/// Implementations enforce the one-active-download-per-scene invariant and
/// the status state machine atomically.
pub trait QueueStore: Send + Sync {
    /// Insert a new Queued item. Fails with `QueueError::Duplicate` when
    /// the scene already has an item in the occupancy set.
    fn accept(&self, request: AcceptRequest) -> Result<DownloadQueueItem, QueueError>;

    fn get(&self, id: &str) -> Result<Option<DownloadQueueItem>, QueueError>;

    /// The scene's item in the occupancy set, if any.
    fn get_active_for_scene(&self, scene_id: &str)
        -> Result<Option<DownloadQueueItem>, QueueError>;

    fn list_by_status(&self, status: DownloadStatus) -> Result<Vec<DownloadQueueItem>, QueueError>;

    fn count_by_status(&self, status: DownloadStatus) -> Result<i64, QueueError>;

    /// Transition an item's status, enforcing the state machine. A move to
    /// Completed stamps `completed_at`.
    fn update_status(
        &self,
        id: &str,
        new_status: DownloadStatus,
    ) -> Result<DownloadQueueItem, QueueError>;

    /// Set or clear the client-side handle for an item.
    fn set_client_handle(&self, id: &str, handle: Option<&str>) -> Result<(), QueueError>;

    /// Record a failed client add: status becomes AddFailed, the attempt
    /// counter increments, and the error message is kept.
    fn record_add_failure(&self, id: &str, error: &str) -> Result<DownloadQueueItem, QueueError>;

    /// AddFailed items whose attempt count and backoff window allow another
    /// try under the policy.
    fn retry_eligible(&self, policy: &RetryPolicy) -> Result<Vec<DownloadQueueItem>, QueueError>;

    /// AddFailed items that ran out of attempts, for manual surfacing.
    fn list_exhausted_add_failures(
        &self,
        policy: &RetryPolicy,
    ) -> Result<Vec<DownloadQueueItem>, QueueError>;
}
