pub mod config;
pub mod indexer;
pub mod matching;
pub mod metadata;
pub mod metrics;
pub mod profile;
pub mod queue;
pub mod reconcile;
pub mod scene;
pub mod testing;
pub mod torrent_client;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use indexer::{Indexer, IndexerError, MultiIndexerSearch, SearchQuery, TorrentCandidate};
pub use matching::{parse_quality, rank_candidates, score, ScorerConfig};
pub use metadata::{MetadataError, MetadataProvider, SemanticScorer};
pub use profile::QualityProfile;
pub use queue::{DownloadQueue, DownloadStatus, QueueError, RetryPolicy};
pub use reconcile::{DriftPolicy, ReconcileSummary, ReconciliationEngine};
pub use scene::{Scene, SceneStore, SqliteSceneStore};
pub use torrent_client::{TorrentClient, TorrentClientError};
