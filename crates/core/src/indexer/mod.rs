//! Indexer fan-out: query multiple torrent indexers concurrently,
//! normalize their results and group near-duplicate listings.

pub mod grouping;
pub mod infohash;
pub mod progress;
pub mod search;
pub mod types;

pub use grouping::{group_candidates, mark_matched};
pub use infohash::{extract_hash_from_magnet, magnet_for_hash, normalize_info_hash};
pub use progress::{ProgressReporter, SearchProgress};
pub use search::{MultiIndexerSearch, SearchOptions};
pub use types::{
    FanOutResult, Indexer, IndexerError, RawResult, SearchQuery, TorrentCandidate,
};
