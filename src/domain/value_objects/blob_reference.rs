use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Logical location of an object: `<container>/<path-within-container>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobReference {
    container: String,
    object_path: String,
}

impl BlobReference {
    pub const SEPARATOR: char = '/';

    /// Split on the first separator. Everything after it is the object
    /// path, so nested paths survive intact.
    ///
    /// Empty segments are rejected: object stores normalise `a//b` and
    /// trailing separators away, which would address a different object.
    pub fn parse(reference: &str) -> Result<Self, DomainError> {
        if reference.is_empty() {
            return Err(DomainError::InvalidReference(
                "Blob reference cannot be empty".to_string(),
            ));
        }

        let (container, object_path) = reference.split_once(Self::SEPARATOR).ok_or_else(|| {
            DomainError::InvalidReference(format!(
                "Blob reference '{}' has no '{}' separator",
                reference,
                Self::SEPARATOR
            ))
        })?;

        if container.is_empty() {
            return Err(DomainError::InvalidReference(format!(
                "Blob reference '{}' has an empty container",
                reference
            )));
        }

        if object_path.is_empty() {
            return Err(DomainError::InvalidReference(format!(
                "Blob reference '{}' has an empty object path",
                reference
            )));
        }

        if object_path.split(Self::SEPARATOR).any(str::is_empty) {
            return Err(DomainError::InvalidReference(format!(
                "Blob reference '{}' has an empty path segment",
                reference
            )));
        }

        Ok(Self {
            container: container.to_string(),
            object_path: object_path.to_string(),
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn object_path(&self) -> &str {
        &self.object_path
    }
}

impl std::fmt::Display for BlobReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.container, Self::SEPARATOR, self.object_path)
    }
}

impl std::str::FromStr for BlobReference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlobReference {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlobReference> for String {
    fn from(reference: BlobReference) -> Self {
        reference.to_string()
    }
}
