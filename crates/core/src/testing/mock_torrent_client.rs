//! Mock torrent client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::indexer::infohash::extract_hash_from_magnet;
use crate::torrent_client::{
    AddTorrentOptions, ClientTorrent, ClientTorrentState, TorrentClient, TorrentClientError,
    TorrentFilter, TorrentPriority,
};

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Records add/pause/resume calls for assertions
/// - Registers added torrents so `get_torrents` lists them
/// - Simulates failures via a consumed-once injected error
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    torrents: Mutex<HashMap<String, ClientTorrent>>,
    add_calls: Mutex<Vec<AddTorrentOptions>>,
    paused: Mutex<Vec<String>>,
    resumed: Mutex<Vec<String>>,
    next_error: Mutex<Option<TorrentClientError>>,
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next operation to fail with the given error.
    /// The error is consumed by the first call that checks it.
    pub fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// All recorded add requests, in call order.
    pub fn add_calls(&self) -> Vec<AddTorrentOptions> {
        self.add_calls.lock().unwrap().clone()
    }

    /// Hashes passed to `pause_torrent`, in call order.
    pub fn paused_hashes(&self) -> Vec<String> {
        self.paused.lock().unwrap().clone()
    }

    /// Hashes passed to `resume_torrent`, in call order.
    pub fn resumed_hashes(&self) -> Vec<String> {
        self.resumed.lock().unwrap().clone()
    }

    /// Drop every registered torrent, simulating external removal.
    pub fn clear_torrents(&self) {
        self.torrents.lock().unwrap().clear();
    }

    pub fn has_torrent(&self, hash: &str) -> bool {
        self.torrents.lock().unwrap().contains_key(hash)
    }

    /// Pre-register a torrent for testing list operations.
    pub fn register_torrent(&self, torrent: ClientTorrent) {
        self.torrents
            .lock()
            .unwrap()
            .insert(torrent.hash.clone(), torrent);
    }

    fn take_error(&self) -> Option<TorrentClientError> {
        self.next_error.lock().unwrap().take()
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_torrent(&self, options: AddTorrentOptions) -> Result<bool, TorrentClientError> {
        self.add_torrent_and_get_hash(options, 0).await.map(|_| true)
    }

    async fn add_torrent_and_get_hash(
        &self,
        options: AddTorrentOptions,
        _timeout_ms: u64,
    ) -> Result<Option<String>, TorrentClientError> {
        self.add_calls.lock().unwrap().push(options.clone());
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        let hash = match extract_hash_from_magnet(&options.url) {
            Some(hash) => hash,
            None => return Ok(None),
        };

        self.torrents.lock().unwrap().insert(
            hash.clone(),
            ClientTorrent {
                hash: hash.clone(),
                name: format!("Mock Torrent {}", &hash[..8]),
                state: ClientTorrentState::Downloading,
                progress: 0.0,
                size_bytes: 100 * 1024 * 1024,
                category: options.category.clone(),
                save_path: options.save_path.clone(),
                added_at: Some(Utc::now()),
            },
        );

        Ok(Some(hash))
    }

    async fn get_torrents(
        &self,
        filter: &TorrentFilter,
    ) -> Result<Vec<ClientTorrent>, TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        let torrents = self.torrents.lock().unwrap();
        let mut result: Vec<ClientTorrent> = torrents
            .values()
            .filter(|t| {
                if let Some(state) = filter.state {
                    if t.state != state {
                        return false;
                    }
                }
                if let Some(category) = &filter.category {
                    if t.category.as_ref() != Some(category) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.hash.cmp(&b.hash));
        Ok(result)
    }

    async fn pause_torrent(&self, hash: &str) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        self.paused.lock().unwrap().push(hash.to_string());
        let mut torrents = self.torrents.lock().unwrap();
        match torrents.get_mut(hash) {
            Some(torrent) => {
                torrent.state = ClientTorrentState::Paused;
                Ok(())
            }
            None => Err(TorrentClientError::TorrentNotFound(hash.to_string())),
        }
    }

    async fn resume_torrent(&self, hash: &str) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        self.resumed.lock().unwrap().push(hash.to_string());
        let mut torrents = self.torrents.lock().unwrap();
        match torrents.get_mut(hash) {
            Some(torrent) => {
                torrent.state = ClientTorrentState::Downloading;
                Ok(())
            }
            None => Err(TorrentClientError::TorrentNotFound(hash.to_string())),
        }
    }

    async fn remove_torrent(
        &self,
        hash: &str,
        _delete_files: bool,
    ) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        if self.torrents.lock().unwrap().remove(hash).is_some() {
            Ok(())
        } else {
            Err(TorrentClientError::TorrentNotFound(hash.to_string()))
        }
    }

    async fn set_torrent_priority(
        &self,
        hash: &str,
        _priority: TorrentPriority,
    ) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        if self.torrents.lock().unwrap().contains_key(hash) {
            Ok(())
        } else {
            Err(TorrentClientError::TorrentNotFound(hash.to_string()))
        }
    }

    async fn set_speed_limit(&self, hash: &str, _limit: u64) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        if self.torrents.lock().unwrap().contains_key(hash) {
            Ok(())
        } else {
            Err(TorrentClientError::TorrentNotFound(hash.to_string()))
        }
    }

    async fn set_global_speed_limits(
        &self,
        _download: u64,
        _upload: u64,
    ) -> Result<(), TorrentClientError> {
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        true
    }
}
