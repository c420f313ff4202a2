//! External-state reconciliation: detect drift between the queue and the
//! torrent client or filesystem, and recover per the configured policy.

pub mod engine;
pub mod types;

pub use engine::ReconciliationEngine;
pub use types::{
    DriftPolicy, FileScanner, MissingFile, MissingFilePolicy, ReconcileError, ReconcileSummary,
    RemovedTorrentPolicy,
};
