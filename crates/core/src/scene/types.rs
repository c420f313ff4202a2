//! Core scene data types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Kind of content a scene record describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Scene,
    Jav,
    Movie,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Scene => "scene",
            ContentType::Jav => "jav",
            ContentType::Movie => "movie",
        }
    }
}

/// A canonical scene tracked by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    /// Unique id (uuid).
    pub id: String,
    /// Canonical title.
    pub title: String,
    /// Release date, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// Studio product code (jav content), e.g. `ABC-123`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// External ids keyed by metadata source name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub external_ids: HashMap<String, String>,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming scene data, before a duplicate check and store insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneCandidate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub external_ids: HashMap<String, String>,
    pub content_type: ContentType,
}

impl SceneCandidate {
    pub fn new(title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            title: title.into(),
            release_date: None,
            code: None,
            external_ids: HashMap::new(),
            content_type,
        }
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_external_id(mut self, source: impl Into<String>, id: impl Into<String>) -> Self {
        self.external_ids.insert(source.into(), id.into());
        self
    }
}

/// Why a scene is excluded from automatic acquisition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Media file was deleted on disk by the user.
    UserDeleted,
    /// Torrent was removed from the client by hand.
    ManualRemoval,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::UserDeleted => "user_deleted",
            ExclusionReason::ManualRemoval => "manual_removal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user_deleted" => Some(ExclusionReason::UserDeleted),
            "manual_removal" => Some(ExclusionReason::ManualRemoval),
            _ => None,
        }
    }
}

/// A scene the engine must not re-acquire automatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneExclusion {
    pub scene_id: String,
    pub reason: ExclusionReason,
    pub created_at: DateTime<Utc>,
}

/// Match state of a torrent group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Matched,
    Unknown,
    Ignored,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Matched => "matched",
            GroupStatus::Unknown => "unknown",
            GroupStatus::Ignored => "ignored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "matched" => Some(GroupStatus::Matched),
            "unknown" => Some(GroupStatus::Unknown),
            "ignored" => Some(GroupStatus::Ignored),
            _ => None,
        }
    }
}

/// Which discovery pass produced a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Performer,
    Studio,
    Targeted,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPhase::Performer => "performer",
            SearchPhase::Studio => "studio",
            SearchPhase::Targeted => "targeted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "performer" => Some(SearchPhase::Performer),
            "studio" => Some(SearchPhase::Studio),
            "targeted" => Some(SearchPhase::Targeted),
            _ => None,
        }
    }
}

/// A cluster of torrent listings that appear to describe one scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentGroup {
    pub id: String,
    /// Normalized comparison key the group clusters on.
    pub group_title: String,
    /// The raw titles that fell into the group.
    pub raw_titles: Vec<String>,
    /// Matched scene, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,
    pub torrent_count: u32,
    /// Distinct indexers the titles came from.
    pub indexer_count: u32,
    pub status: GroupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    pub phase: SearchPhase,
}

/// Pointer to a downloaded media file for a scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneFileRecord {
    pub scene_id: String,
    pub path: String,
    pub recorded_at: DateTime<Utc>,
}

/// Errors from scene store operations.
#[derive(Debug, Error)]
pub enum SceneStoreError {
    #[error("Scene not found: {0}")]
    NotFound(String),

    // Not named `source`: thiserror reserves that name for the error chain.
    #[error("External id already registered: {source_name}/{external_id}")]
    DuplicateExternalId {
        source_name: String,
        external_id: String,
    },

    #[error("Database error: {0}")]
    Database(String),
}
