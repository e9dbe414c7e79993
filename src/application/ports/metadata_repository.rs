use async_trait::async_trait;
#[cfg(test)]
use mockall::{automock, predicate::*};
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::ImageMetadata;

/// Postgres SQLSTATE for a statement cancelled by `statement_timeout`
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Metadata write timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(QUERY_CANCELED) {
                    return RepositoryError::Timeout(Duration::ZERO);
                }
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Database(db_err.message().to_string()),
                }
            }
            sqlx::Error::Io(e) => RepositoryError::Unavailable(e.to_string()),
            sqlx::Error::Tls(e) => RepositoryError::Unavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                RepositoryError::Unavailable("timed out acquiring a connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                RepositoryError::Unavailable("connection pool is closed".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                RepositoryError::Unavailable("connection worker crashed".to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                RepositoryError::SerializationError(err.to_string())
            }
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

/// Result of a single metadata write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    /// An identical row already existed (skip-duplicate mode only)
    SkippedDuplicate,
}

/// Port for metadata persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Insert one row for the record and commit
    async fn insert(&self, metadata: &ImageMetadata) -> Result<WriteOutcome, RepositoryError>;

    /// All rows recorded for a file name
    async fn find_by_file_name(
        &self,
        file_name: &str,
    ) -> Result<Vec<ImageMetadata>, RepositoryError>;
}
