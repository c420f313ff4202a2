//! Types for external-state reconciliation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do when a tracked torrent vanished from the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemovedTorrentPolicy {
    /// Rebuild the magnet from the stored info hash and resubmit.
    ReAdd,
    /// Treat the removal as intentional: fail the item and exclude the
    /// scene from re-acquisition.
    Exclude,
}

/// What to do when a scene's recorded media file is gone from disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingFilePolicy {
    /// Clear the file record so the scene becomes acquirable again.
    Redownload,
    /// Treat the deletion as intentional and exclude the scene.
    Exclude,
}

/// How reconciliation reacts to each kind of drift.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftPolicy {
    pub removed_torrent: RemovedTorrentPolicy,
    pub missing_file: MissingFilePolicy,
}

impl Default for DriftPolicy {
    fn default() -> Self {
        Self {
            removed_torrent: RemovedTorrentPolicy::ReAdd,
            missing_file: MissingFilePolicy::Redownload,
        }
    }
}

/// Counts of the actions one reconciliation run performed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconcileSummary {
    /// Vanished torrents resubmitted to the client.
    pub re_added: u32,
    /// Items marked Failed (removal treated as intentional, or re-add
    /// impossible).
    pub failed: u32,
    /// New scene exclusions recorded.
    pub excluded: u32,
    /// File records cleared.
    pub files_cleared: u32,
    /// Drift events skipped because the scene was already excluded.
    pub skipped_excluded: u32,
    /// Transient client errors encountered (the affected diff is skipped).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client_errors: Vec<String>,
}

/// A scene whose recorded media file is no longer on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissingFile {
    pub scene_id: String,
    pub path: String,
}

/// Errors from reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Queue error: {0}")]
    Queue(#[from] crate::queue::types::QueueError),

    #[error("Scene store error: {0}")]
    SceneStore(#[from] crate::scene::types::SceneStoreError),

    #[error("Filesystem scan failed: {0}")]
    Scan(String),
}

/// Reports scenes whose recorded files are missing from disk.
#[async_trait]
pub trait FileScanner: Send + Sync {
    async fn missing_files(&self) -> Result<Vec<MissingFile>, ReconcileError>;
}
