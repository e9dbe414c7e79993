//! Error taxonomy shared by both activities
//!
//! Every use case error maps onto one [`ErrorKind`]. Callers that drive the
//! activities (the pipeline runner, the CLI, an orchestrator adapter) decide
//! about retries from the kind alone.

use serde::{Deserialize, Serialize};

use crate::application::ports::{RepositoryError, StorageError};
use crate::config::ConfigError;
use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidReference,
    MissingInput,
    StoreUnavailable,
    Timeout,
    ObjectNotFound,
    AccessDenied,
    UnsupportedOrCorruptImage,
    ConstraintViolation,
    Configuration,
    Internal,
}

impl ErrorKind {
    /// Transient infrastructure faults are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::StoreUnavailable | ErrorKind::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidReference => "InvalidReference",
            ErrorKind::MissingInput => "MissingInput",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ObjectNotFound => "ObjectNotFound",
            ErrorKind::AccessDenied => "AccessDenied",
            ErrorKind::UnsupportedOrCorruptImage => "UnsupportedOrCorruptImage",
            ErrorKind::ConstraintViolation => "ConstraintViolation",
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can be classified into the shared taxonomy
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl Classify for DomainError {
    fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidReference(_) => ErrorKind::InvalidReference,
            DomainError::InvalidDimensions { .. }
            | DomainError::InvalidSize(_)
            | DomainError::EmptyFileName => ErrorKind::MissingInput,
        }
    }
}

impl Classify for StorageError {
    fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Unavailable(_) => ErrorKind::StoreUnavailable,
            StorageError::NotFound(_) => ErrorKind::ObjectNotFound,
            StorageError::AccessDenied(_) => ErrorKind::AccessDenied,
            StorageError::InvalidPath(_) => ErrorKind::InvalidReference,
            StorageError::Timeout(_) => ErrorKind::Timeout,
            StorageError::Misconfigured(_) => ErrorKind::Configuration,
        }
    }
}

impl Classify for RepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Unavailable(_) => ErrorKind::StoreUnavailable,
            RepositoryError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            RepositoryError::Timeout(_) => ErrorKind::Timeout,
            RepositoryError::Database(_) | RepositoryError::SerializationError(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl Classify for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_transient_kinds_are_retryable() {
        assert!(ErrorKind::StoreUnavailable.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());

        for kind in [
            ErrorKind::InvalidReference,
            ErrorKind::MissingInput,
            ErrorKind::ObjectNotFound,
            ErrorKind::AccessDenied,
            ErrorKind::UnsupportedOrCorruptImage,
            ErrorKind::ConstraintViolation,
            ErrorKind::Configuration,
            ErrorKind::Internal,
        ] {
            assert!(!kind.is_retryable(), "{} should not be retryable", kind);
        }
    }

    #[test]
    fn test_storage_error_kinds() {
        assert_eq!(
            StorageError::NotFound("x".to_string()).kind(),
            ErrorKind::ObjectNotFound
        );
        assert_eq!(
            StorageError::AccessDenied("x".to_string()).kind(),
            ErrorKind::AccessDenied
        );
        assert_eq!(
            StorageError::Unavailable("x".to_string()).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            StorageError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn test_repository_error_kinds() {
        assert_eq!(
            RepositoryError::ConstraintViolation("x".to_string()).kind(),
            ErrorKind::ConstraintViolation
        );
        assert_eq!(
            RepositoryError::Unavailable("x".to_string()).kind(),
            ErrorKind::StoreUnavailable
        );
        assert!(RepositoryError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn test_domain_error_kinds() {
        assert_eq!(
            DomainError::InvalidReference("x".to_string()).kind(),
            ErrorKind::InvalidReference
        );
        assert_eq!(DomainError::EmptyFileName.kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            ErrorKind::UnsupportedOrCorruptImage.to_string(),
            "UnsupportedOrCorruptImage"
        );
    }
}
