//! Types for metadata provider operations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// File hash kind accepted by scene-by-hash lookups.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HashType {
    Oshash,
    Md5,
    Phash,
}

/// A scene as described by a metadata source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataScene {
    /// Id within the source.
    pub external_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performers: Vec<String>,
    /// Additional ids keyed by source name, for cross-linking.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub external_ids: HashMap<String, String>,
}

/// A performer as described by a metadata source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataPerformer {
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// A studio as described by a metadata source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataStudio {
    pub external_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A paged result from a metadata search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matches across all pages, when the source reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Trait for metadata provider backends.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name for logging and external-id attribution.
    fn name(&self) -> &str;

    async fn search_scenes(
        &self,
        query: &str,
        limit: u32,
        page: u32,
    ) -> Result<Page<MetadataScene>, MetadataError>;

    async fn search_performers(
        &self,
        query: &str,
        limit: u32,
        page: u32,
    ) -> Result<Page<MetadataPerformer>, MetadataError>;

    async fn search_studios(
        &self,
        query: &str,
        limit: u32,
        page: u32,
    ) -> Result<Page<MetadataStudio>, MetadataError>;

    async fn get_scene_by_id(&self, id: &str) -> Result<Option<MetadataScene>, MetadataError>;

    async fn get_performer_by_id(
        &self,
        id: &str,
    ) -> Result<Option<MetadataPerformer>, MetadataError>;

    async fn get_studio_by_id(&self, id: &str) -> Result<Option<MetadataStudio>, MetadataError>;

    /// Fingerprint lookup for a local media file.
    async fn get_scene_by_hash(
        &self,
        hash: &str,
        hash_type: HashType,
    ) -> Result<Option<MetadataScene>, MetadataError>;

    /// Check whether the provider is reachable.
    async fn test_connection(&self) -> bool;
}

/// Cross-encoder similarity between a listing title and a scene title,
/// in [0, 1]. Absence or failure means the caller falls back to lexical
/// scoring.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    async fn score(&self, candidate_title: &str, scene_title: &str)
        -> Result<f32, MetadataError>;
}
