//! Reconciliation integration tests.
//!
//! These tests verify drift handling between the durable queue and the
//! mock torrent client across repeated runs:
//! - Re-adding torrents removed from the client externally
//! - Excluding scenes under the exclusion policy, exactly once
//! - Clearing stale file records reported by the scanner

use std::sync::Arc;

use tempfile::TempDir;

use scenarr_core::indexer::infohash::magnet_for_hash;
use scenarr_core::indexer::types::TorrentCandidate;
use scenarr_core::matching::parse_quality;
use scenarr_core::queue::sqlite_store::SqliteQueueStore;
use scenarr_core::queue::store::QueueStore;
use scenarr_core::reconcile::{
    MissingFile, MissingFilePolicy, ReconciliationEngine, RemovedTorrentPolicy,
};
use scenarr_core::scene::sqlite_store::SqliteSceneStore;
use scenarr_core::scene::store::SceneStore;
use scenarr_core::scene::types::{ContentType, SceneCandidate};
use scenarr_core::testing::{MockFileScanner, MockTorrentClient};
use scenarr_core::{DownloadQueue, DownloadStatus, DriftPolicy};

const HASH: &str = "C12FE1C06BBA254A9DC9F519B335AA7C1367A88A";

struct TestHarness {
    queue: Arc<DownloadQueue>,
    scenes: Arc<SqliteSceneStore>,
    client: Arc<MockTorrentClient>,
    policy: DriftPolicy,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(policy: DriftPolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let queue_store = Arc::new(
            SqliteQueueStore::new(&temp_dir.path().join("queue.db"))
                .expect("Failed to create queue store"),
        );
        let scenes = Arc::new(
            SqliteSceneStore::new(&temp_dir.path().join("scenes.db"))
                .expect("Failed to create scene store"),
        );
        let client = Arc::new(MockTorrentClient::new());
        let queue = Arc::new(DownloadQueue::new(queue_store).with_client(client.clone()));

        Self {
            queue,
            scenes,
            client,
            policy,
            _temp_dir: temp_dir,
        }
    }

    fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.queue.clone(), self.scenes.clone())
            .with_client(self.client.clone())
            .with_policy(self.policy)
    }

    async fn accepted_scene(&self) -> (String, String) {
        let scene = self
            .scenes
            .create(SceneCandidate::new("Beach Day", ContentType::Scene))
            .unwrap();
        let item = self
            .queue
            .accept_candidate(&scene.id, &candidate())
            .await
            .unwrap();
        (scene.id, item.id)
    }
}

fn candidate() -> TorrentCandidate {
    TorrentCandidate {
        title: "Beach Day 1080p WEB-DL".to_string(),
        info_hash: HASH.to_string(),
        link: Some(magnet_for_hash(HASH)),
        size_bytes: 1_000_000,
        seeders: 10,
        leechers: 1,
        indexer: "idx".to_string(),
        publish_date: None,
        parsed: parse_quality("Beach Day 1080p WEB-DL"),
        score: Some(95.0),
    }
}

fn exclude_policy() -> DriftPolicy {
    DriftPolicy {
        removed_torrent: RemovedTorrentPolicy::Exclude,
        missing_file: MissingFilePolicy::Exclude,
    }
}

#[tokio::test]
async fn test_vanished_torrent_re_added_by_default() {
    let h = TestHarness::new(DriftPolicy::default());
    let (_, item_id) = h.accepted_scene().await;

    h.client.clear_torrents();
    let summary = h.engine().run().await.unwrap();
    assert_eq!(summary.re_added, 1);

    // The item is tracked again under a fresh client handle.
    let item = h.queue.store().get(&item_id).unwrap().unwrap();
    assert_eq!(item.status, DownloadStatus::Downloading);
    assert!(h.client.has_torrent(HASH));
}

#[tokio::test]
async fn test_exclusion_applied_exactly_once_across_runs() {
    let h = TestHarness::new(exclude_policy());
    let (scene_id, item_id) = h.accepted_scene().await;

    h.client.clear_torrents();
    let first = h.engine().run().await.unwrap();
    assert_eq!(first.failed, 1);
    assert_eq!(first.excluded, 1);

    let item = h.queue.store().get(&item_id).unwrap().unwrap();
    assert_eq!(item.status, DownloadStatus::Failed);
    assert!(item.client_handle.is_none());
    assert!(h.scenes.is_excluded(&scene_id).unwrap());

    // Failed items are terminal: the second run finds no drift.
    let second = h.engine().run().await.unwrap();
    assert_eq!(second.failed, 0);
    assert_eq!(second.excluded, 0);
}

#[tokio::test]
async fn test_missing_file_cleared_for_redownload() {
    let h = TestHarness::new(DriftPolicy::default());
    let scene = h
        .scenes
        .create(SceneCandidate::new("Beach Day", ContentType::Scene))
        .unwrap();
    h.scenes.set_file_record(&scene.id, "/media/gone.mp4").unwrap();

    let scanner = Arc::new(MockFileScanner::with_missing(vec![MissingFile {
        scene_id: scene.id.clone(),
        path: "/media/gone.mp4".to_string(),
    }]));
    let engine = h.engine().with_scanner(scanner);

    let summary = engine.run().await.unwrap();
    assert_eq!(summary.files_cleared, 1);
    assert_eq!(summary.excluded, 0);
    assert!(h.scenes.get_file_record(&scene.id).unwrap().is_none());

    // A second run is a no-op once the record is cleared.
    let summary = engine.run().await.unwrap();
    assert_eq!(summary.files_cleared, 0);
}

#[tokio::test]
async fn test_client_outage_leaves_state_untouched() {
    let h = TestHarness::new(DriftPolicy::default());
    let (_, item_id) = h.accepted_scene().await;

    h.client.clear_torrents();
    h.client.set_next_error(
        scenarr_core::TorrentClientError::ConnectionFailed("down".to_string()),
    );

    let summary = h.engine().run().await.unwrap();
    assert_eq!(summary.client_errors.len(), 1);
    assert_eq!(summary.re_added, 0);

    let item = h.queue.store().get(&item_id).unwrap().unwrap();
    assert_eq!(item.status, DownloadStatus::Downloading);
}
