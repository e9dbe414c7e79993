use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::dto::{ExtractRequest, MetadataRecord};
use crate::application::errors::{Classify, ErrorKind};
use crate::application::ports::{BlobStore, StorageError};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::BlobReference;
use crate::infrastructure::imaging::{ExtractionError, MetadataExtractor};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl Classify for ExtractError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::MissingInput(_) => ErrorKind::MissingInput,
            ExtractError::Domain(e) => e.kind(),
            ExtractError::Storage(e) => e.kind(),
            ExtractError::Extraction(e) => e.kind(),
        }
    }
}

/// Use case: turn a blob reference into a metadata record.
///
/// Reads from the blob store and computes; nothing is written anywhere, so
/// re-running it for the same input is always safe.
pub struct ExtractMetadataUseCase {
    blob_store: Arc<dyn BlobStore>,
}

impl ExtractMetadataUseCase {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }

    /// Execute resolve, fetch and extract, in that order
    pub async fn execute(&self, request: ExtractRequest) -> Result<MetadataRecord, ExtractError> {
        // 1. Validate input before touching the store
        let blob_name = request
            .blob_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ExtractError::MissingInput("blob_name".to_string()))?;

        // 2. Resolve container and object path
        let reference = BlobReference::parse(&blob_name)?;

        // 3. Read the whole object
        let bytes = self.blob_store.fetch(&reference).await?;

        // 4. Decode header and build the record
        let metadata = MetadataExtractor::extract(&bytes, reference.object_path())?;
        let record = MetadataRecord::from(metadata);

        info!(
            container = reference.container(),
            file_name = %record.file_name,
            size_kb = record.size_kb,
            width = record.width,
            height = record.height,
            format = record.format.as_deref().unwrap_or("unknown"),
            "Extracted metadata"
        );

        Ok(record)
    }
}
