//! Reconciliation of durable queue state against the torrent client and
//! the filesystem.
//!
//! Both of those drift independently: users remove torrents from the
//! client and delete files from disk without telling the engine. One run
//! diffs each external surface against the stored state and applies the
//! configured drift policy. Running twice in a row produces no duplicate
//! side effects.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::types::{
    DriftPolicy, FileScanner, MissingFilePolicy, ReconcileError, ReconcileSummary,
    RemovedTorrentPolicy,
};
use crate::metrics;
use crate::queue::manager::DownloadQueue;
use crate::queue::store::QueueStore;
use crate::queue::types::DownloadStatus;
use crate::scene::store::SceneStore;
use crate::scene::types::ExclusionReason;
use crate::torrent_client::{TorrentClient, TorrentFilter};

/// Diffs stored download state against the client and the filesystem.
pub struct ReconciliationEngine {
    queue: Arc<DownloadQueue>,
    scene_store: Arc<dyn SceneStore>,
    client: Option<Arc<dyn TorrentClient>>,
    scanner: Option<Arc<dyn FileScanner>>,
    policy: DriftPolicy,
}

impl ReconciliationEngine {
    pub fn new(queue: Arc<DownloadQueue>, scene_store: Arc<dyn SceneStore>) -> Self {
        Self {
            queue,
            scene_store,
            client: None,
            scanner: None,
            policy: DriftPolicy::default(),
        }
    }

    pub fn with_client(mut self, client: Arc<dyn TorrentClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn FileScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_policy(mut self, policy: DriftPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run both diffs and return what was done.
    pub async fn run(&self) -> Result<ReconcileSummary, ReconcileError> {
        let mut summary = ReconcileSummary::default();
        metrics::RECONCILE_RUNS.inc();

        self.reconcile_client(&mut summary).await?;
        self.reconcile_files(&mut summary).await?;

        info!(
            re_added = summary.re_added,
            failed = summary.failed,
            excluded = summary.excluded,
            files_cleared = summary.files_cleared,
            skipped_excluded = summary.skipped_excluded,
            "reconciliation finished"
        );
        Ok(summary)
    }

    async fn reconcile_client(&self, summary: &mut ReconcileSummary) -> Result<(), ReconcileError> {
        let client = match &self.client {
            Some(client) => client,
            None => {
                warn!("no torrent client configured, skipping client diff");
                return Ok(());
            }
        };

        let live: HashSet<String> = match client.get_torrents(&TorrentFilter::default()).await {
            Ok(torrents) => torrents.into_iter().map(|t| t.hash.to_uppercase()).collect(),
            Err(err) => {
                // Transient transport failure: report it, keep the run alive.
                warn!(error = %err, "client listing failed, skipping client diff");
                summary.client_errors.push(err.to_string());
                return Ok(());
            }
        };

        let mut tracked = self.queue.store().list_by_status(DownloadStatus::Downloading)?;
        tracked.extend(self.queue.store().list_by_status(DownloadStatus::Paused)?);

        for item in tracked {
            let present = item
                .client_handle
                .as_deref()
                .is_some_and(|h| live.contains(&h.to_uppercase()));
            if present {
                continue;
            }

            warn!(item_id = %item.id, scene_id = %item.scene_id, "tracked torrent missing from client");
            metrics::RECONCILE_DRIFTS.inc();

            let re_add = self.policy.removed_torrent == RemovedTorrentPolicy::ReAdd
                && (item.info_hash.is_some() || item.link.is_some());

            if re_add {
                let after = self.queue.fail_removed(&item.id, true).await?;
                if after.status == DownloadStatus::AddFailed {
                    summary.failed += 1;
                } else {
                    summary.re_added += 1;
                }
                continue;
            }

            self.queue.fail_removed(&item.id, false).await?;
            summary.failed += 1;

            if self.scene_store.add_exclusion(&item.scene_id, ExclusionReason::ManualRemoval)? {
                summary.excluded += 1;
            } else {
                summary.skipped_excluded += 1;
            }
        }

        Ok(())
    }

    async fn reconcile_files(&self, summary: &mut ReconcileSummary) -> Result<(), ReconcileError> {
        let scanner = match &self.scanner {
            Some(scanner) => scanner,
            None => return Ok(()),
        };

        for missing in scanner.missing_files().await? {
            if self.scene_store.is_excluded(&missing.scene_id)? {
                summary.skipped_excluded += 1;
                continue;
            }

            match self.policy.missing_file {
                MissingFilePolicy::Redownload => {
                    info!(scene_id = %missing.scene_id, path = %missing.path, "clearing stale file record");
                }
                MissingFilePolicy::Exclude => {
                    warn!(scene_id = %missing.scene_id, path = %missing.path, "file deleted, excluding scene");
                    if self
                        .scene_store
                        .add_exclusion(&missing.scene_id, ExclusionReason::UserDeleted)?
                    {
                        summary.excluded += 1;
                    }
                }
            }

            if self.scene_store.clear_file_record(&missing.scene_id)? {
                summary.files_cleared += 1;
            }
        }

        Ok(())
    }
}
