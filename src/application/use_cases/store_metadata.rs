use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::Validate;

use crate::application::dto::MetadataRecord;
use crate::application::errors::{Classify, ErrorKind};
use crate::application::ports::{MetadataRepository, RepositoryError, WriteOutcome};
use crate::domain::entities::ImageMetadata;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidRecord(_) => ErrorKind::MissingInput,
            StoreError::Repository(e) => e.kind(),
        }
    }
}

/// Use case: durably record one metadata record
pub struct StoreMetadataUseCase {
    metadata_repo: Arc<dyn MetadataRepository>,
}

impl StoreMetadataUseCase {
    pub fn new(metadata_repo: Arc<dyn MetadataRepository>) -> Self {
        Self { metadata_repo }
    }

    pub async fn execute(&self, record: MetadataRecord) -> Result<WriteOutcome, StoreError> {
        // 1. Records may arrive from outside the pipeline; check them first
        record
            .validate()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let metadata = ImageMetadata::try_from(record)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        // 2. Single insert + commit
        let outcome = self.metadata_repo.insert(&metadata).await?;

        info!(
            file_name = metadata.file_name(),
            ?outcome,
            "Metadata stored"
        );

        Ok(outcome)
    }
}
