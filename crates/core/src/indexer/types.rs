//! Types for the indexer search system.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::matching::quality::ParsedQuality;

/// Query parameters for an indexer search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query.
    pub query: String,
    /// Optional: limit to specific indexers by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexers: Option<Vec<String>>,
    /// Optional: limit to indexer-native category ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Maximum results to return per indexer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            indexers: None,
            categories: None,
            limit: None,
        }
    }
}

/// Raw result from a single indexer, before normalization.
#[derive(Debug, Clone)]
pub struct RawResult {
    pub title: String,
    pub indexer: String,
    /// Info hash as reported: 40-char hex, 32-char base32, or absent.
    pub info_hash: Option<String>,
    /// Magnet URI or downloadable link.
    pub link: Option<String>,
    pub size_bytes: u64,
    pub seeders: u32,
    pub leechers: u32,
    pub publish_date: Option<NaiveDate>,
}

/// A normalized search result ready for scoring and filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentCandidate {
    /// Raw listing title.
    pub title: String,
    /// Canonical info hash (uppercase hex). Empty string if unknown.
    pub info_hash: String,
    /// Magnet URI or downloadable link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Seeders reported by the indexer.
    pub seeders: u32,
    /// Leechers reported by the indexer.
    pub leechers: u32,
    /// Which indexer returned this result.
    pub indexer: String,
    /// When the torrent was published, if the indexer reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDate>,
    /// Quality attributes parsed from the title.
    pub parsed: ParsedQuality,
    /// Match score against a scene, set by the ranking pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Fan-out search result with per-indexer error reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutResult {
    /// The query that was executed.
    pub query: SearchQuery,
    /// Normalized candidates across all indexers, deterministically ordered.
    pub candidates: Vec<TorrentCandidate>,
    /// How long the search took in milliseconds.
    pub duration_ms: u64,
    /// Indexers that failed or timed out (name -> error message).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub indexer_errors: HashMap<String, String>,
}

/// Errors that can occur during indexer operations.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Indexer connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Indexer API error: {0}")]
    ApiError(String),

    #[error("Rate limited, retry in {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for torrent indexer backends.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Indexer name for logging and error attribution.
    fn name(&self) -> &str;

    /// Execute a search against this indexer.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, IndexerError>;

    /// Check whether the indexer is reachable.
    async fn test_connection(&self) -> bool;
}
