//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service
//! traits, allowing lifecycle testing without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use scenarr_core::testing::{MockIndexer, MockTorrentClient};
//!
//! let indexer = MockIndexer::new("mock").with_results(vec![/* results */]);
//! let client = MockTorrentClient::new();
//!
//! // Simulate external removal between reconciliation runs
//! client.clear_torrents();
//! ```

mod mock_file_scanner;
mod mock_indexer;
mod mock_semantic_scorer;
mod mock_torrent_client;

pub use mock_file_scanner::MockFileScanner;
pub use mock_indexer::MockIndexer;
pub use mock_semantic_scorer::MockSemanticScorer;
pub use mock_torrent_client::MockTorrentClient;
