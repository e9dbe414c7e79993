use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::{BlobStore, StorageError};
use crate::domain::value_objects::BlobReference;
use crate::infrastructure::storage::{read_object, StorageConnectionString};

/// Azure Blob Storage adapter.
///
/// A client is built for the referenced container on every fetch and dropped
/// when the read completes, so no session outlives an invocation.
pub struct AzureBlobStore {
    connection: StorageConnectionString,
    fetch_timeout: Duration,
}

impl AzureBlobStore {
    pub fn new(connection: StorageConnectionString, fetch_timeout: Duration) -> Self {
        Self {
            connection,
            fetch_timeout,
        }
    }

    pub fn from_connection_string(
        connection_string: &str,
        fetch_timeout: Duration,
    ) -> Result<Self, StorageError> {
        Ok(Self::new(
            StorageConnectionString::parse(connection_string)?,
            fetch_timeout,
        ))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn fetch(&self, reference: &BlobReference) -> Result<Bytes, StorageError> {
        let client = self
            .connection
            .builder_for(reference.container())
            .build()
            .map_err(|e| StorageError::Misconfigured(e.to_string()))?;

        debug!(
            container = reference.container(),
            object_path = reference.object_path(),
            "Fetching blob from Azure"
        );

        read_object(&client, reference, self.fetch_timeout).await
    }
}
