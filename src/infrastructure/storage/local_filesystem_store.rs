use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{BlobStore, StorageError};
use crate::domain::value_objects::BlobReference;
use crate::infrastructure::storage::PathBuilder;

/// Blob store backed by a local directory, one subdirectory per container
pub struct LocalFilesystemStore {
    path_builder: PathBuilder,
    fetch_timeout: Duration,
}

impl LocalFilesystemStore {
    pub fn new(root: PathBuf) -> Self {
        Self::with_timeout(root, Duration::from_secs(60))
    }

    pub fn with_timeout(root: PathBuf, fetch_timeout: Duration) -> Self {
        Self {
            path_builder: PathBuilder::new(root),
            fetch_timeout,
        }
    }

    /// Write an object, creating its container directory when needed
    pub async fn put(&self, reference: &BlobReference, content: &[u8]) -> Result<(), StorageError> {
        let path = self.path_builder.object_path(reference)?;
        let location = reference.to_string();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io(e, &location))?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| StorageError::from_io(e, &location))
    }
}

#[async_trait]
impl BlobStore for LocalFilesystemStore {
    async fn fetch(&self, reference: &BlobReference) -> Result<Bytes, StorageError> {
        let path = self.path_builder.object_path(reference)?;
        let location = reference.to_string();
        debug!(path = ?path, "Reading blob from local filesystem");

        let content = tokio::time::timeout(self.fetch_timeout, fs::read(&path))
            .await
            .map_err(|_| StorageError::Timeout(self.fetch_timeout))?
            .map_err(|e| StorageError::from_io(e, &location))?;

        Ok(Bytes::from(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_fetch() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let reference = BlobReference::parse("images-input/nested/pets.jpeg").unwrap();

        store.put(&reference, b"image bytes").await.unwrap();
        let content = store.fetch(&reference).await.unwrap();

        assert_eq!(&content[..], b"image bytes");
        assert!(root
            .path()
            .join("images-input")
            .join("nested")
            .join("pets.jpeg")
            .exists());
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let reference = BlobReference::parse("images-input/missing.png").unwrap();

        let err = store.fetch(&reference).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref p) if p == "images-input/missing.png"));
    }

    #[tokio::test]
    async fn test_fetch_missing_container() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let reference = BlobReference::parse("no-such-container/a.png").unwrap();

        assert!(matches!(
            store.fetch(&reference).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_directory_is_not_found() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let file = BlobReference::parse("images-input/nested/pets.jpeg").unwrap();
        store.put(&file, b"image bytes").await.unwrap();

        let directory = BlobReference::parse("images-input/nested").unwrap();
        let err = store.fetch(&directory).await.unwrap_err();

        assert!(matches!(err, StorageError::NotFound(ref p) if p == "images-input/nested"));
    }

    #[tokio::test]
    async fn test_fetch_below_a_file_is_not_found() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let file = BlobReference::parse("images-input/pets.jpeg").unwrap();
        store.put(&file, b"image bytes").await.unwrap();

        let below = BlobReference::parse("images-input/pets.jpeg/thumb.png").unwrap();
        assert!(matches!(
            store.fetch(&below).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_escaping_path() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().join("blobs"));
        let reference = BlobReference::parse("images-input/../../outside.png").unwrap();

        assert!(matches!(
            store.fetch(&reference).await,
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_is_repeatable() {
        let root = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(root.path().to_path_buf());
        let reference = BlobReference::parse("c/p.bin").unwrap();
        store.put(&reference, &[1, 2, 3]).await.unwrap();

        let first = store.fetch(&reference).await.unwrap();
        let second = store.fetch(&reference).await.unwrap();
        assert_eq!(first, second);
    }
}
