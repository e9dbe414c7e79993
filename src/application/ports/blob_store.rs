use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::{automock, predicate::*};
use std::time::Duration;
use thiserror::Error;

use crate::domain::value_objects::BlobReference;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob store unavailable: {0}")]
    Unavailable(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Blob read timed out after {0:?}")]
    Timeout(Duration),

    #[error("Blob store misconfigured: {0}")]
    Misconfigured(String),
}

impl StorageError {
    /// Classify an I/O failure against the object it was reading
    pub fn from_io(err: std::io::Error, location: &str) -> Self {
        match err.kind() {
            // A directory, or a path running through a file, is no object
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::IsADirectory
            | std::io::ErrorKind::NotADirectory => StorageError::NotFound(location.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StorageError::AccessDenied(location.to_string())
            }
            std::io::ErrorKind::TimedOut => StorageError::Unavailable(format!(
                "{}: timed out at the transport: {}",
                location, err
            )),
            _ => StorageError::Unavailable(format!("{}: {}", location, err)),
        }
    }
}

/// Port for reading whole objects out of blob storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the complete content of the referenced object
    async fn fetch(&self, reference: &BlobReference) -> Result<Bytes, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_not_found() {
        let err = StorageError::from_io(io::Error::from(io::ErrorKind::NotFound), "c/p.png");
        assert!(matches!(err, StorageError::NotFound(ref p) if p == "c/p.png"));
    }

    #[test]
    fn test_from_io_directory_errors_are_not_found() {
        for kind in [io::ErrorKind::IsADirectory, io::ErrorKind::NotADirectory] {
            let err = StorageError::from_io(io::Error::from(kind), "c/nested");
            assert!(matches!(err, StorageError::NotFound(ref p) if p == "c/nested"));
        }
    }

    #[test]
    fn test_from_io_permission_denied() {
        let err = StorageError::from_io(
            io::Error::from(io::ErrorKind::PermissionDenied),
            "c/p.png",
        );
        assert!(matches!(err, StorageError::AccessDenied(_)));
    }

    #[test]
    fn test_from_io_other_is_unavailable() {
        let err = StorageError::from_io(io::Error::other("disk on fire"), "c/p.png");
        assert!(matches!(err, StorageError::Unavailable(ref m) if m.contains("disk on fire")));
    }
}
