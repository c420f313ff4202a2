//! Mock indexer for testing the fan-out search.

use async_trait::async_trait;

use crate::indexer::types::{Indexer, IndexerError, RawResult, SearchQuery};

/// Mock implementation of the Indexer trait. Returns canned results or a
/// canned failure.
#[derive(Debug)]
pub struct MockIndexer {
    name: String,
    results: Vec<RawResult>,
    error: Option<String>,
}

impl MockIndexer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            error: None,
        }
    }

    /// Results every search will return.
    pub fn with_results(mut self, results: Vec<RawResult>) -> Self {
        self.results = results;
        self
    }

    /// Make every search fail with a connection error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<RawResult>, IndexerError> {
        match &self.error {
            Some(message) => Err(IndexerError::ConnectionFailed(message.clone())),
            None => Ok(self.results.clone()),
        }
    }

    async fn test_connection(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_canned_results() {
        let indexer = MockIndexer::new("idx").with_results(vec![RawResult {
            title: "Scene".to_string(),
            indexer: "idx".to_string(),
            info_hash: None,
            link: None,
            size_bytes: 1,
            seeders: 1,
            leechers: 0,
            publish_date: None,
        }]);

        let results = indexer.search(&SearchQuery::new("q")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(indexer.test_connection().await);
    }

    #[tokio::test]
    async fn test_failing_indexer() {
        let indexer = MockIndexer::new("idx").failing("boom");
        let err = indexer.search(&SearchQuery::new("q")).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(!indexer.test_connection().await);
    }
}
