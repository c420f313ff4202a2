//! Types for torrent client operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Torrent not found: {0}")]
    TorrentNotFound(String),

    #[error("Invalid torrent data: {0}")]
    InvalidTorrent(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// State of a torrent in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientTorrentState {
    Downloading,
    Seeding,
    Paused,
    Checking,
    Queued,
    Stalled,
    Error,
    Unknown,
}

impl ClientTorrentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientTorrentState::Downloading => "downloading",
            ClientTorrentState::Seeding => "seeding",
            ClientTorrentState::Paused => "paused",
            ClientTorrentState::Checking => "checking",
            ClientTorrentState::Queued => "queued",
            ClientTorrentState::Stalled => "stalled",
            ClientTorrentState::Error => "error",
            ClientTorrentState::Unknown => "unknown",
        }
    }
}

/// A torrent as reported by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientTorrent {
    /// Info hash (canonical uppercase hex).
    pub hash: String,
    pub name: String,
    pub state: ClientTorrentState,
    /// Download progress (0.0 - 1.0).
    pub progress: f64,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

/// Request to add a new torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTorrentOptions {
    /// Magnet URI or downloadable .torrent URL.
    pub url: String,
    /// Optional download path override.
    pub save_path: Option<String>,
    /// Optional category/label.
    pub category: Option<String>,
    /// Start paused.
    pub paused: bool,
}

impl AddTorrentOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            save_path: None,
            category: None,
            paused: false,
        }
    }

    pub fn with_save_path(mut self, path: impl Into<String>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

/// Queue priority for a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TorrentPriority {
    Top,
    Bottom,
    Position { position: u32 },
}

/// Filter for listing torrents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TorrentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ClientTorrentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Trait for torrent client backends.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Add a new torrent. Returns whether the client accepted it.
    async fn add_torrent(&self, options: AddTorrentOptions) -> Result<bool, TorrentClientError>;

    /// Add a torrent and wait up to `timeout_ms` for the client to report
    /// its info hash. `None` when the hash never showed up in time.
    async fn add_torrent_and_get_hash(
        &self,
        options: AddTorrentOptions,
        timeout_ms: u64,
    ) -> Result<Option<String>, TorrentClientError>;

    /// List torrents known to the client, optionally filtered.
    async fn get_torrents(
        &self,
        filter: &TorrentFilter,
    ) -> Result<Vec<ClientTorrent>, TorrentClientError>;

    async fn pause_torrent(&self, hash: &str) -> Result<(), TorrentClientError>;

    async fn resume_torrent(&self, hash: &str) -> Result<(), TorrentClientError>;

    /// Remove a torrent. If `delete_files` is true, also delete downloaded
    /// files.
    async fn remove_torrent(&self, hash: &str, delete_files: bool)
        -> Result<(), TorrentClientError>;

    async fn set_torrent_priority(
        &self,
        hash: &str,
        priority: TorrentPriority,
    ) -> Result<(), TorrentClientError>;

    /// Set download speed limit for one torrent (bytes/second, 0 = unlimited).
    async fn set_speed_limit(&self, hash: &str, limit: u64) -> Result<(), TorrentClientError>;

    /// Set global speed limits (bytes/second, 0 = unlimited).
    async fn set_global_speed_limits(
        &self,
        download: u64,
        upload: u64,
    ) -> Result<(), TorrentClientError>;

    /// Check whether the client is reachable.
    async fn test_connection(&self) -> bool;
}
