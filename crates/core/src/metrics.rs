//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Indexer fan-out (searches, errors, durations)
//! - Matching (candidates ranked)
//! - Download queue (accepted, completed, add retries)
//! - Reconciliation (runs, drift events)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter};

// =============================================================================
// Search Metrics
// =============================================================================

/// Fan-out searches executed total.
pub static SEARCHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("scenarr_searches_total", "Total fan-out searches executed").unwrap()
});

/// Per-indexer failures and timeouts total.
pub static INDEXER_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_indexer_errors_total",
        "Total indexer failures and timeouts",
    )
    .unwrap()
});

/// Fan-out search duration in seconds.
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "scenarr_search_duration_seconds",
            "Duration of fan-out searches",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

// =============================================================================
// Matching Metrics
// =============================================================================

/// Candidates that survived profile filtering, total.
pub static CANDIDATES_RANKED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_candidates_ranked_total",
        "Total candidates ranked after profile filtering",
    )
    .unwrap()
});

// =============================================================================
// Download Queue Metrics
// =============================================================================

/// Downloads accepted into the queue total.
pub static DOWNLOADS_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_downloads_accepted_total",
        "Total downloads accepted into the queue",
    )
    .unwrap()
});

/// Downloads completed total.
pub static DOWNLOADS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_downloads_completed_total",
        "Total downloads completed successfully",
    )
    .unwrap()
});

/// Client add retries total.
pub static ADD_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_add_retries_total",
        "Total torrent client add retries",
    )
    .unwrap()
});

// =============================================================================
// Reconciliation Metrics
// =============================================================================

/// Reconciliation runs total.
pub static RECONCILE_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_reconcile_runs_total",
        "Total reconciliation runs",
    )
    .unwrap()
});

/// Drift events detected (torrents missing from the client).
pub static RECONCILE_DRIFTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scenarr_reconcile_drifts_total",
        "Total tracked torrents found missing from the client",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(INDEXER_ERRORS.clone()),
        Box::new(SEARCH_DURATION.clone()),
        // Matching
        Box::new(CANDIDATES_RANKED.clone()),
        // Queue
        Box::new(DOWNLOADS_ACCEPTED.clone()),
        Box::new(DOWNLOADS_COMPLETED.clone()),
        Box::new(ADD_RETRIES.clone()),
        // Reconciliation
        Box::new(RECONCILE_RUNS.clone()),
        Box::new(RECONCILE_DRIFTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
