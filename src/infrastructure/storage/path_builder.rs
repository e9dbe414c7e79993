use std::path::{Component, Path, PathBuf};

use crate::application::ports::StorageError;
use crate::domain::value_objects::BlobReference;

/// Maps blob references onto a directory tree: `{root}/{container}/{object_path}`
pub struct PathBuilder {
    root: PathBuf,
}

impl PathBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a reference to a file below the root.
    ///
    /// Only plain segments are accepted, so a reference can never address
    /// anything outside its container directory.
    pub fn object_path(&self, reference: &BlobReference) -> Result<PathBuf, StorageError> {
        let mut path = self.root.join(Self::segment(reference.container(), reference)?);

        for segment in Path::new(reference.object_path()).components() {
            match segment {
                Component::Normal(part) => path.push(part),
                _ => return Err(StorageError::AccessDenied(reference.to_string())),
            }
        }

        Ok(path)
    }

    fn segment<'a>(
        container: &'a str,
        reference: &BlobReference,
    ) -> Result<&'a str, StorageError> {
        let mut components = Path::new(container).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(container),
            _ => Err(StorageError::AccessDenied(reference.to_string())),
        }
    }
}
