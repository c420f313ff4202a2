//! Download queue data types and the status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a queued download.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Queued,
    Downloading,
    Paused,
    Completed,
    Failed,
    /// The torrent client rejected or never acknowledged the add.
    AddFailed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Queued => "queued",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Paused => "paused",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
            DownloadStatus::AddFailed => "add_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(DownloadStatus::Queued),
            "downloading" => Some(DownloadStatus::Downloading),
            "paused" => Some(DownloadStatus::Paused),
            "completed" => Some(DownloadStatus::Completed),
            "failed" => Some(DownloadStatus::Failed),
            "add_failed" => Some(DownloadStatus::AddFailed),
            _ => None,
        }
    }

    /// Completed and Failed are final; nothing transitions out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadStatus::Completed | DownloadStatus::Failed)
    }

    /// Statuses that occupy a scene's single active-download slot.
    pub fn occupies_scene(&self) -> bool {
        matches!(
            self,
            DownloadStatus::Queued | DownloadStatus::Downloading | DownloadStatus::Paused
        )
    }

    /// Whether this status may transition to `next`. Downloading/Paused
    /// back to Queued is the recovery path for torrents that vanished from
    /// the client and get resubmitted.
    pub fn can_transition_to(&self, next: DownloadStatus) -> bool {
        use DownloadStatus::*;
        matches!(
            (self, next),
            (Queued, Downloading)
                | (Queued, Paused)
                | (Queued, Failed)
                | (Downloading, Paused)
                | (Downloading, Completed)
                | (Downloading, Failed)
                | (Downloading, Queued)
                | (Paused, Downloading)
                | (Paused, Failed)
                | (Paused, Queued)
                | (AddFailed, Queued)
                | (AddFailed, Failed)
        )
    }
}

/// Retry bookkeeping for failed client adds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetryState {
    /// Client add attempts made so far.
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// When an AddFailed item becomes eligible for another attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_after_minutes: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_after_minutes: 30,
        }
    }
}

/// A tracked download for one scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadQueueItem {
    pub id: String,
    pub scene_id: String,
    /// Listing title the download was accepted under.
    pub title: String,
    pub size_bytes: u64,
    pub seeders: u32,
    /// Human-readable quality summary, e.g. `1080p web-dl`.
    pub quality: String,
    pub status: DownloadStatus,
    /// Canonical info hash, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    /// Magnet or link the add was performed with, kept for re-adds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Hash the torrent client tracks this download under. Cleared when the
    /// torrent disappears from the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_handle: Option<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry: RetryState,
}

/// Request to enqueue a download for a scene.
#[derive(Debug, Clone)]
pub struct AcceptRequest {
    pub scene_id: String,
    pub title: String,
    pub size_bytes: u64,
    pub seeders: u32,
    pub quality: String,
    pub info_hash: Option<String>,
    pub link: Option<String>,
}

/// Errors from queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue item not found: {0}")]
    NotFound(String),

    #[error("Scene {0} already has an active download")]
    Duplicate(String),

    #[error("Invalid transition for item {item_id}: {from} -> {to}")]
    InvalidTransition {
        item_id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Scene store error: {0}")]
    SceneStore(#[from] crate::scene::types::SceneStoreError),

    #[error("Database error: {0}")]
    Database(String),
}
