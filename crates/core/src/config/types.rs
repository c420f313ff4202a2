use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::indexer::search::SearchOptions;
use crate::matching::scorer::ScorerConfig;
use crate::queue::types::RetryPolicy;
use crate::reconcile::types::DriftPolicy;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub matching: ScorerConfig,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub reconcile: DriftPolicy,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("scenarr.db")
}

/// Torrent client submission configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// How long to wait for the client to report the added torrent's hash,
    /// in milliseconds.
    #[serde(default = "default_add_timeout_ms")]
    pub add_timeout_ms: u64,
    /// Category assigned to submitted torrents, when the client supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            add_timeout_ms: default_add_timeout_ms(),
            category: None,
        }
    }
}

fn default_add_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::RemovedTorrentPolicy;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "scenarr.db");
        assert_eq!(config.matching.semantic_weight, 0.7);
        assert_eq!(config.search.timeout_ms, 30_000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(
            config.reconcile.removed_torrent,
            RemovedTorrentPolicy::ReAdd
        );
        assert_eq!(config.download.add_timeout_ms, 30_000);
        assert!(config.download.category.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[database]
path = "/data/scenarr.sqlite"

[matching]
semantic_weight = 0.5
semantic_confidence_min = 0.4

[search]
timeout_ms = 10000

[retry]
max_attempts = 5
retry_after_minutes = 10

[reconcile]
removed_torrent = "exclude"
missing_file = "redownload"

[download]
add_timeout_ms = 5000
category = "scenarr"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/scenarr.sqlite");
        assert_eq!(config.matching.semantic_weight, 0.5);
        assert_eq!(config.search.timeout_ms, 10_000);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(
            config.reconcile.removed_torrent,
            RemovedTorrentPolicy::Exclude
        );
        assert_eq!(config.download.category.as_deref(), Some("scenarr"));
    }
}
