//! Concurrent fan-out search across configured indexers.
//!
//! Each indexer gets one timeout-bounded call. Individual failures and
//! timeouts never abort the batch: they become entries in the result's
//! `indexer_errors` map and the remaining indexers' results are kept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::infohash::{extract_hash_from_magnet, normalize_info_hash};
use super::progress::{ProgressReporter, SearchProgress};
use super::types::{FanOutResult, Indexer, RawResult, SearchQuery, TorrentCandidate};
use crate::matching::dates::extract_date;
use crate::matching::quality::parse_quality;
use crate::metrics;

/// Fan-out tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Per-indexer call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

/// Searches every configured indexer concurrently and merges the results.
pub struct MultiIndexerSearch {
    indexers: Vec<Arc<dyn Indexer>>,
    progress: ProgressReporter,
}

impl MultiIndexerSearch {
    pub fn new(indexers: Vec<Arc<dyn Indexer>>) -> Self {
        Self {
            indexers,
            progress: ProgressReporter::disabled(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Run the query against all indexers (or the query's subset).
    ///
    /// Candidate order is deterministic: sorted by title, then indexer,
    /// then info hash, regardless of which indexer answered first.
    pub async fn search(&self, query: &SearchQuery, options: &SearchOptions) -> FanOutResult {
        let started = Instant::now();
        let timeout = Duration::from_millis(options.timeout_ms);

        let selected: Vec<&Arc<dyn Indexer>> = self
            .indexers
            .iter()
            .filter(|idx| match &query.indexers {
                Some(names) => names.iter().any(|n| n == idx.name()),
                None => true,
            })
            .collect();

        let calls = selected.iter().map(|idx| {
            let idx = Arc::clone(idx);
            async move {
                let outcome = tokio::time::timeout(timeout, idx.search(query)).await;
                (idx.name().to_string(), outcome)
            }
        });

        let mut candidates = Vec::new();
        let mut indexer_errors = HashMap::new();

        for (name, outcome) in join_all(calls).await {
            match outcome {
                Ok(Ok(raw_results)) => {
                    debug!(indexer = %name, results = raw_results.len(), "indexer search completed");
                    self.progress.emit(SearchProgress::IndexerCompleted {
                        indexer: name,
                        results: raw_results.len(),
                    });
                    candidates.extend(raw_results.into_iter().map(normalize_result));
                }
                Ok(Err(err)) => {
                    warn!(indexer = %name, error = %err, "indexer search failed");
                    metrics::INDEXER_ERRORS.inc();
                    self.progress.emit(SearchProgress::IndexerFailed {
                        indexer: name.clone(),
                        error: err.to_string(),
                    });
                    indexer_errors.insert(name, err.to_string());
                }
                Err(_) => {
                    warn!(indexer = %name, timeout_ms = options.timeout_ms, "indexer search timed out");
                    metrics::INDEXER_ERRORS.inc();
                    self.progress.emit(SearchProgress::IndexerFailed {
                        indexer: name.clone(),
                        error: "timeout".to_string(),
                    });
                    indexer_errors.insert(name, "timeout".to_string());
                }
            }
        }

        candidates.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then_with(|| a.indexer.cmp(&b.indexer))
                .then_with(|| a.info_hash.cmp(&b.info_hash))
        });

        if let Some(limit) = query.limit {
            candidates.truncate(limit as usize);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        metrics::SEARCHES_TOTAL.inc();
        metrics::SEARCH_DURATION.observe(duration_ms as f64 / 1000.0);
        self.progress.emit(SearchProgress::SearchCompleted {
            candidates: candidates.len(),
            errors: indexer_errors.len(),
        });

        FanOutResult {
            query: query.clone(),
            candidates,
            duration_ms,
            indexer_errors,
        }
    }
}

/// Turn a raw indexer row into a normalized candidate: canonical hash,
/// parsed quality, extracted publish date fallback.
fn normalize_result(raw: RawResult) -> TorrentCandidate {
    let info_hash = raw
        .info_hash
        .as_deref()
        .and_then(normalize_info_hash)
        .or_else(|| raw.link.as_deref().and_then(extract_hash_from_magnet))
        .unwrap_or_default();

    let publish_date = raw.publish_date.or_else(|| extract_date(&raw.title));
    let parsed = parse_quality(&raw.title);

    TorrentCandidate {
        title: raw.title,
        info_hash,
        link: raw.link,
        size_bytes: raw.size_bytes,
        seeders: raw.seeders,
        leechers: raw.leechers,
        indexer: raw.indexer,
        publish_date,
        parsed,
        score: None,
    }
}
