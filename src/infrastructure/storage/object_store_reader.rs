use bytes::Bytes;
use object_store::{path::Path, ObjectStore};
use std::time::Duration;

use crate::application::ports::StorageError;
use crate::domain::value_objects::BlobReference;

/// Read a whole object from any `object_store` backend, bounded by `timeout`
pub async fn read_object(
    store: &dyn ObjectStore,
    reference: &BlobReference,
    timeout: Duration,
) -> Result<Bytes, StorageError> {
    let location = Path::parse(reference.object_path())
        .map_err(|e| StorageError::InvalidPath(format!("{}: {}", reference, e)))?;

    let read = async { store.get(&location).await?.bytes().await };

    match tokio::time::timeout(timeout, read).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(map_object_store_error(e, reference)),
        Err(_) => Err(StorageError::Timeout(timeout)),
    }
}

pub fn map_object_store_error(err: object_store::Error, reference: &BlobReference) -> StorageError {
    let message = format!("{}: {}", reference, err);
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound(reference.to_string()),
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => StorageError::AccessDenied(message),
        object_store::Error::InvalidPath { .. } => StorageError::InvalidPath(message),
        object_store::Error::UnknownConfigurationKey { .. }
        | object_store::Error::NotSupported { .. } => StorageError::Misconfigured(message),
        _ => StorageError::Unavailable(message),
    }
}
