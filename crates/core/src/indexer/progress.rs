//! Non-blocking progress events for long-running searches.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Progress event emitted during a fan-out search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchProgress {
    /// One indexer finished with results.
    IndexerCompleted { indexer: String, results: usize },
    /// One indexer failed or timed out.
    IndexerFailed { indexer: String, error: String },
    /// The whole fan-out finished.
    SearchCompleted { candidates: usize, errors: usize },
}

/// Fire-and-forget progress reporter. Events are dropped when the channel
/// is full or no consumer is attached; a search never blocks on reporting.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<SearchProgress>>,
}

impl ProgressReporter {
    /// A reporter that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a reporter and the receiving end of its bounded channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SearchProgress>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, event: SearchProgress) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let (reporter, mut rx) = ProgressReporter::channel(8);
        reporter.emit(SearchProgress::IndexerCompleted {
            indexer: "idx1".to_string(),
            results: 3,
        });
        reporter.emit(SearchProgress::SearchCompleted {
            candidates: 3,
            errors: 0,
        });

        assert_eq!(
            rx.recv().await,
            Some(SearchProgress::IndexerCompleted {
                indexer: "idx1".to_string(),
                results: 3
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(SearchProgress::SearchCompleted {
                candidates: 3,
                errors: 0
            })
        );
    }

    #[test]
    fn test_disabled_reporter_never_panics() {
        let reporter = ProgressReporter::disabled();
        reporter.emit(SearchProgress::SearchCompleted {
            candidates: 0,
            errors: 0,
        });
    }

    #[tokio::test]
    async fn test_full_channel_drops_instead_of_blocking() {
        let (reporter, mut rx) = ProgressReporter::channel(1);
        for i in 0..10 {
            reporter.emit(SearchProgress::IndexerCompleted {
                indexer: format!("idx{i}"),
                results: i,
            });
        }
        // Only the first event fit; the rest were dropped.
        assert_eq!(
            rx.recv().await,
            Some(SearchProgress::IndexerCompleted {
                indexer: "idx0".to_string(),
                results: 0
            })
        );
        assert!(rx.try_recv().is_err());
    }
}
