//! Mock semantic scorer for testing the ranking pipeline.

use async_trait::async_trait;

use crate::metadata::{MetadataError, SemanticScorer};

/// Mock implementation of the SemanticScorer trait. Returns a fixed score
/// or a fixed failure.
#[derive(Debug)]
pub struct MockSemanticScorer {
    score: Option<f32>,
}

impl MockSemanticScorer {
    /// Score every pair with the same value.
    pub fn with_score(score: f32) -> Self {
        Self { score: Some(score) }
    }

    /// Fail every scoring call.
    pub fn failing() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl SemanticScorer for MockSemanticScorer {
    async fn score(
        &self,
        _candidate_title: &str,
        _scene_title: &str,
    ) -> Result<f32, MetadataError> {
        match self.score {
            Some(score) => Ok(score),
            None => Err(MetadataError::Internal(
                "semantic scorer unavailable".to_string(),
            )),
        }
    }
}
