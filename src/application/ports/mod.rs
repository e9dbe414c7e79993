mod blob_store;
mod metadata_repository;

pub use blob_store::{BlobStore, StorageError};
pub use metadata_repository::{MetadataRepository, RepositoryError, WriteOutcome};

#[cfg(test)]
pub use blob_store::MockBlobStore;
#[cfg(test)]
pub use metadata_repository::MockMetadataRepository;
