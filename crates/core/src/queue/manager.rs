//! Download queue service.
//!
//! Drives queue items through the torrent client: accepting candidates,
//! retrying failed adds under the retry policy, and handling torrents that
//! were removed from the client externally. The client is an optional
//! capability; without one, accepted items land in AddFailed and wait for
//! the retry machinery.

use std::sync::Arc;

use tracing::{info, warn};

use super::store::QueueStore;
use super::types::{
    AcceptRequest, DownloadQueueItem, DownloadStatus, QueueError, RetryPolicy,
};
use crate::indexer::infohash::magnet_for_hash;
use crate::indexer::types::TorrentCandidate;
use crate::metrics;
use crate::torrent_client::{AddTorrentOptions, TorrentClient};

/// Outcome of a retry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    pub retried: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Stale AddFailed items whose scene gained another active download.
    pub superseded: usize,
}

/// Queue manager wiring the store to an optional torrent client.
pub struct DownloadQueue {
    store: Arc<dyn QueueStore>,
    client: Option<Arc<dyn TorrentClient>>,
    policy: RetryPolicy,
    add_timeout_ms: u64,
    category: Option<String>,
}

impl DownloadQueue {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self {
            store,
            client: None,
            policy: RetryPolicy::default(),
            add_timeout_ms: 30_000,
            category: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn TorrentClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn QueueStore> {
        &self.store
    }

    /// Accept a ranked candidate for a scene and hand it to the torrent
    /// client. A scene with an active download is rejected with
    /// `QueueError::Duplicate` before anything reaches the client.
    pub async fn accept_candidate(
        &self,
        scene_id: &str,
        candidate: &TorrentCandidate,
    ) -> Result<DownloadQueueItem, QueueError> {
        let quality = format!(
            "{} {}",
            candidate.parsed.resolution.as_keyword(),
            candidate.parsed.source.as_keyword()
        );

        let item = self.store.accept(AcceptRequest {
            scene_id: scene_id.to_string(),
            title: candidate.title.clone(),
            size_bytes: candidate.size_bytes,
            seeders: candidate.seeders,
            quality,
            info_hash: (!candidate.info_hash.is_empty()).then(|| candidate.info_hash.clone()),
            link: candidate.link.clone(),
        })?;

        info!(item_id = %item.id, scene_id, title = %item.title, "download accepted");
        metrics::DOWNLOADS_ACCEPTED.inc();

        self.attempt_add(item).await
    }

    /// Resubmit every retry-eligible AddFailed item.
    ///
    /// Per-item failures are counted and logged, never aborting the sweep.
    /// An AddFailed item does not hold the scene's active slot, so the
    /// scene may have been re-accepted since the failure; requeueing such
    /// a stale item would collide with the newer download, so it is failed
    /// in place instead.
    pub async fn retry_failed_adds(&self) -> Result<RetryOutcome, QueueError> {
        let mut outcome = RetryOutcome::default();

        for item in self.store.retry_eligible(&self.policy)? {
            if self.store.get_active_for_scene(&item.scene_id)?.is_some() {
                info!(
                    item_id = %item.id,
                    scene_id = %item.scene_id,
                    "add failure superseded by a newer download"
                );
                self.store.update_status(&item.id, DownloadStatus::Failed)?;
                outcome.superseded += 1;
                continue;
            }

            outcome.retried += 1;
            metrics::ADD_RETRIES.inc();

            let requeued = match self.store.update_status(&item.id, DownloadStatus::Queued) {
                Ok(requeued) => requeued,
                Err(err) => {
                    warn!(item_id = %item.id, error = %err, "requeue for retry failed");
                    outcome.failed += 1;
                    continue;
                }
            };
            match self.attempt_add(requeued).await {
                Ok(after) if after.status == DownloadStatus::AddFailed => outcome.failed += 1,
                Ok(_) => outcome.succeeded += 1,
                Err(err) => {
                    warn!(item_id = %item.id, error = %err, "retry attempt failed");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    pub fn mark_completed(&self, item_id: &str) -> Result<DownloadQueueItem, QueueError> {
        let item = self.store.update_status(item_id, DownloadStatus::Completed)?;
        info!(item_id, scene_id = %item.scene_id, "download completed");
        metrics::DOWNLOADS_COMPLETED.inc();
        Ok(item)
    }

    pub async fn pause(&self, item_id: &str) -> Result<DownloadQueueItem, QueueError> {
        let item = self.store.update_status(item_id, DownloadStatus::Paused)?;
        if let (Some(client), Some(handle)) = (&self.client, &item.client_handle) {
            if let Err(err) = client.pause_torrent(handle).await {
                warn!(item_id, error = %err, "client pause failed");
            }
        }
        Ok(item)
    }

    pub async fn resume(&self, item_id: &str) -> Result<DownloadQueueItem, QueueError> {
        let item = self
            .store
            .update_status(item_id, DownloadStatus::Downloading)?;
        if let (Some(client), Some(handle)) = (&self.client, &item.client_handle) {
            if let Err(err) = client.resume_torrent(handle).await {
                warn!(item_id, error = %err, "client resume failed");
            }
        }
        Ok(item)
    }

    /// Handle a torrent that disappeared from the client. With `re_add`
    /// the stored magnet is resubmitted and the item returns to Queued;
    /// otherwise the item fails with its handle cleared.
    pub async fn fail_removed(
        &self,
        item_id: &str,
        re_add: bool,
    ) -> Result<DownloadQueueItem, QueueError> {
        let item = self
            .store
            .get(item_id)?
            .ok_or_else(|| QueueError::NotFound(item_id.to_string()))?;

        self.store.set_client_handle(&item.id, None)?;

        if re_add && self.client.is_some() && add_url(&item).is_some() {
            info!(item_id, scene_id = %item.scene_id, "re-adding externally removed torrent");
            let requeued = self.store.update_status(&item.id, DownloadStatus::Queued)?;
            return self.attempt_add(requeued).await;
        }

        warn!(item_id, scene_id = %item.scene_id, "torrent removed externally, failing item");
        self.store.update_status(&item.id, DownloadStatus::Failed)
    }

    /// Hand a Queued item to the client, recording AddFailed on any
    /// rejection path.
    async fn attempt_add(&self, item: DownloadQueueItem) -> Result<DownloadQueueItem, QueueError> {
        let client = match &self.client {
            Some(client) => client,
            None => {
                warn!(item_id = %item.id, "no torrent client configured, add deferred");
                return self
                    .store
                    .record_add_failure(&item.id, "torrent client unavailable");
            }
        };

        let url = match add_url(&item) {
            Some(url) => url,
            None => {
                return self
                    .store
                    .record_add_failure(&item.id, "no magnet link or info hash");
            }
        };

        let mut options = AddTorrentOptions::new(url);
        if let Some(category) = &self.category {
            options = options.with_category(category.clone());
        }

        match client.add_torrent_and_get_hash(options, self.add_timeout_ms).await {
            Ok(Some(hash)) => {
                self.store.set_client_handle(&item.id, Some(&hash))?;
                let mut updated = self.store.update_status(&item.id, DownloadStatus::Downloading)?;
                updated.client_handle = Some(hash);
                Ok(updated)
            }
            Ok(None) => {
                warn!(item_id = %item.id, "client did not report torrent hash");
                self.store
                    .record_add_failure(&item.id, "client did not report torrent hash")
            }
            Err(err) => {
                warn!(item_id = %item.id, error = %err, "client rejected torrent add");
                self.store.record_add_failure(&item.id, &err.to_string())
            }
        }
    }
}

fn add_url(item: &DownloadQueueItem) -> Option<String> {
    item.link
        .clone()
        .or_else(|| item.info_hash.as_deref().map(magnet_for_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::quality::parse_quality;
    use crate::queue::sqlite_store::SqliteQueueStore;
    use crate::testing::MockTorrentClient;
    use crate::torrent_client::TorrentClientError;

    const HASH: &str = "C12FE1C06BBA254A9DC9F519B335AA7C1367A88A";

    fn candidate() -> TorrentCandidate {
        TorrentCandidate {
            title: "Jane Doe - Beach Day 1080p WEB-DL x264-GRP".to_string(),
            info_hash: HASH.to_string(),
            link: Some(magnet_for_hash(HASH)),
            size_bytes: 1_500_000_000,
            seeders: 12,
            leechers: 2,
            indexer: "idx".to_string(),
            publish_date: None,
            parsed: parse_quality("Jane Doe - Beach Day 1080p WEB-DL x264-GRP"),
            score: Some(97.0),
        }
    }

    fn queue_with_client() -> (DownloadQueue, Arc<MockTorrentClient>) {
        let store = Arc::new(SqliteQueueStore::in_memory().unwrap());
        let client = Arc::new(MockTorrentClient::new());
        let queue = DownloadQueue::new(store)
            .with_client(client.clone())
            .with_policy(RetryPolicy {
                max_attempts: 3,
                retry_after_minutes: 0,
            });
        (queue, client)
    }

    #[tokio::test]
    async fn test_accept_hands_to_client() {
        let (queue, client) = queue_with_client();

        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(item.status, DownloadStatus::Downloading);
        assert_eq!(item.client_handle.as_deref(), Some(HASH));
        assert_eq!(item.quality, "1080p web-dl");
        assert_eq!(client.add_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_without_client_defers() {
        let store = Arc::new(SqliteQueueStore::in_memory().unwrap());
        let queue = DownloadQueue::new(store);

        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(item.status, DownloadStatus::AddFailed);
        assert_eq!(item.retry.attempts, 1);
        assert_eq!(
            item.retry.last_error.as_deref(),
            Some("torrent client unavailable")
        );
    }

    #[tokio::test]
    async fn test_accept_client_error_records_failure() {
        let (queue, client) = queue_with_client();
        client.set_next_error(TorrentClientError::ConnectionFailed("down".to_string()));

        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(item.status, DownloadStatus::AddFailed);
        assert!(item.retry.last_error.as_deref().unwrap().contains("down"));
    }

    #[tokio::test]
    async fn test_duplicate_accept_rejected() {
        let (queue, _) = queue_with_client();
        queue.accept_candidate("scene-1", &candidate()).await.unwrap();

        let result = queue.accept_candidate("scene-1", &candidate()).await;
        assert!(matches!(result, Err(QueueError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_retry_after_client_recovers() {
        let (queue, client) = queue_with_client();
        client.set_next_error(TorrentClientError::ConnectionFailed("down".to_string()));

        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(item.status, DownloadStatus::AddFailed);

        // Client is healthy again; the sweep resubmits the item.
        let outcome = queue.retry_failed_adds().await.unwrap();
        assert_eq!(
            outcome,
            RetryOutcome {
                retried: 1,
                succeeded: 1,
                failed: 0,
                superseded: 0
            }
        );

        let after = queue.store().get(&item.id).unwrap().unwrap();
        assert_eq!(after.status, DownloadStatus::Downloading);
        assert_eq!(after.client_handle.as_deref(), Some(HASH));
    }

    #[tokio::test]
    async fn test_retry_sweep_survives_superseded_add_failure() {
        let (queue, client) = queue_with_client();

        // First acceptance fails at the client, then the scene is
        // re-accepted successfully, stranding a stale AddFailed row.
        client.set_next_error(TorrentClientError::ConnectionFailed("down".to_string()));
        let stale = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(stale.status, DownloadStatus::AddFailed);
        let active = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(active.status, DownloadStatus::Downloading);

        // A later eligible item must still get its retry in the same sweep.
        client.set_next_error(TorrentClientError::Timeout);
        let other = queue.accept_candidate("scene-2", &candidate()).await.unwrap();
        assert_eq!(other.status, DownloadStatus::AddFailed);

        let outcome = queue.retry_failed_adds().await.unwrap();
        assert_eq!(
            outcome,
            RetryOutcome {
                retried: 1,
                succeeded: 1,
                failed: 0,
                superseded: 1
            }
        );

        // Stale row is failed in place; the newer download is untouched.
        let stale = queue.store().get(&stale.id).unwrap().unwrap();
        assert_eq!(stale.status, DownloadStatus::Failed);
        let active = queue.store().get(&active.id).unwrap().unwrap();
        assert_eq!(active.status, DownloadStatus::Downloading);
        let other = queue.store().get(&other.id).unwrap().unwrap();
        assert_eq!(other.status, DownloadStatus::Downloading);
    }

    #[tokio::test]
    async fn test_retry_stops_at_max_attempts() {
        let store = Arc::new(SqliteQueueStore::in_memory().unwrap());
        let client = Arc::new(MockTorrentClient::new());
        let queue = DownloadQueue::new(store)
            .with_client(client.clone())
            .with_policy(RetryPolicy {
                max_attempts: 2,
                retry_after_minutes: 0,
            });

        client.set_next_error(TorrentClientError::Timeout);
        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(item.retry.attempts, 1);

        client.set_next_error(TorrentClientError::Timeout);
        let outcome = queue.retry_failed_adds().await.unwrap();
        assert_eq!(outcome.failed, 1);

        // Two attempts used; nothing left to retry.
        let outcome = queue.retry_failed_adds().await.unwrap();
        assert_eq!(outcome.retried, 0);

        let exhausted = queue
            .store()
            .list_exhausted_add_failures(&queue.policy())
            .unwrap();
        assert_eq!(exhausted.len(), 1);
    }

    #[tokio::test]
    async fn test_pause_resume_round_trip() {
        let (queue, client) = queue_with_client();
        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();

        let paused = queue.pause(&item.id).await.unwrap();
        assert_eq!(paused.status, DownloadStatus::Paused);
        assert_eq!(client.paused_hashes(), vec![HASH.to_string()]);

        let resumed = queue.resume(&item.id).await.unwrap();
        assert_eq!(resumed.status, DownloadStatus::Downloading);
        assert_eq!(client.resumed_hashes(), vec![HASH.to_string()]);
    }

    #[tokio::test]
    async fn test_mark_completed() {
        let (queue, _) = queue_with_client();
        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();

        let done = queue.mark_completed(&item.id).unwrap();
        assert_eq!(done.status, DownloadStatus::Completed);
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_fail_removed_without_re_add() {
        let (queue, _) = queue_with_client();
        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();

        let failed = queue.fail_removed(&item.id, false).await.unwrap();
        assert_eq!(failed.status, DownloadStatus::Failed);

        let stored = queue.store().get(&item.id).unwrap().unwrap();
        assert!(stored.client_handle.is_none());
    }

    #[tokio::test]
    async fn test_fail_removed_with_re_add() {
        let (queue, client) = queue_with_client();
        let item = queue.accept_candidate("scene-1", &candidate()).await.unwrap();
        assert_eq!(client.add_calls().len(), 1);

        let re_added = queue.fail_removed(&item.id, true).await.unwrap();
        assert_eq!(re_added.status, DownloadStatus::Downloading);
        assert_eq!(re_added.client_handle.as_deref(), Some(HASH));
        assert_eq!(client.add_calls().len(), 2);
    }
}
