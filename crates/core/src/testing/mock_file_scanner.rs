//! Mock filesystem scanner for testing reconciliation.

use async_trait::async_trait;

use crate::reconcile::types::{FileScanner, MissingFile, ReconcileError};

/// Mock implementation of the FileScanner trait with a canned report.
#[derive(Debug, Default)]
pub struct MockFileScanner {
    missing: Vec<MissingFile>,
}

impl MockFileScanner {
    pub fn with_missing(missing: Vec<MissingFile>) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl FileScanner for MockFileScanner {
    async fn missing_files(&self) -> Result<Vec<MissingFile>, ReconcileError> {
        Ok(self.missing.clone())
    }
}
