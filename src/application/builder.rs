use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use crate::application::{
    errors::{Classify, ErrorKind},
    pipeline::{PipelineRunner, RetryPolicy},
    ports::{BlobStore, MetadataRepository, StorageError},
    use_cases::{ExtractMetadataUseCase, StoreMetadataUseCase},
};
use crate::config::{BlobBackend, Config, ConfigError};
use crate::infrastructure::{
    persistence::PostgresMetadataRepository,
    storage::{AzureBlobStore, LocalFilesystemStore},
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Blob store setup failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database pool setup failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl Classify for BuildError {
    fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Config(e) => e.kind(),
            BuildError::Storage(e) => e.kind(),
            BuildError::Database(_) => ErrorKind::Configuration,
        }
    }
}

/// Wires configuration into the two activities.
///
/// Nothing here opens a connection: the blob store connects per fetch and the
/// database pool is lazy, so a missing or unreachable backend only surfaces
/// when an activity runs. Only the settings an activity needs are required
/// for building it.
pub struct ApplicationBuilder {
    config: Config,
    blob_store: Option<Arc<dyn BlobStore>>,
    metadata_repo: Option<Arc<dyn MetadataRepository>>,
}

impl ApplicationBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            blob_store: None,
            metadata_repo: None,
        }
    }

    /// Use a pre-built blob store instead of the configured backend
    pub fn with_blob_store(mut self, blob_store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(blob_store);
        self
    }

    /// Use a pre-built repository instead of the configured database
    pub fn with_metadata_repository(mut self, metadata_repo: Arc<dyn MetadataRepository>) -> Self {
        self.metadata_repo = Some(metadata_repo);
        self
    }

    fn blob_store(&self) -> Result<Arc<dyn BlobStore>, BuildError> {
        if let Some(blob_store) = &self.blob_store {
            return Ok(Arc::clone(blob_store));
        }

        let timeout = self.config.blob_fetch_timeout();
        let blob_store: Arc<dyn BlobStore> = match self.config.blob_backend {
            BlobBackend::Azure => {
                let connection_string = self.config.blob_connection_string()?;
                Arc::new(AzureBlobStore::from_connection_string(
                    connection_string,
                    timeout,
                )?)
            }
            BlobBackend::Local => {
                let root = self.config.local_blob_root()?;
                Arc::new(LocalFilesystemStore::with_timeout(root.clone(), timeout))
            }
        };

        info!(backend = ?self.config.blob_backend, "Blob store configured");
        Ok(blob_store)
    }

    fn metadata_repository(&self) -> Result<Arc<dyn MetadataRepository>, BuildError> {
        if let Some(metadata_repo) = &self.metadata_repo {
            return Ok(Arc::clone(metadata_repo));
        }

        let pool = self.lazy_pool()?;
        info!(
            max_connections = self.config.db_max_connections,
            acquire_timeout_secs = self.config.db_acquire_timeout_secs,
            write_mode = %self.config.write_mode,
            "Metadata repository configured"
        );

        Ok(Arc::new(PostgresMetadataRepository::with_options(
            pool,
            self.config.write_mode,
            self.config.db_write_timeout(),
        )))
    }

    /// Pool that connects on first use
    pub fn lazy_pool(&self) -> Result<sqlx::PgPool, BuildError> {
        let database_url = self.config.database_url()?;
        Ok(PgPoolOptions::new()
            .max_connections(self.config.db_max_connections)
            .acquire_timeout(self.config.db_acquire_timeout())
            .connect_lazy(database_url)?)
    }

    pub fn build_extract(&self) -> Result<Arc<ExtractMetadataUseCase>, BuildError> {
        Ok(Arc::new(ExtractMetadataUseCase::new(self.blob_store()?)))
    }

    pub fn build_store(&self) -> Result<Arc<StoreMetadataUseCase>, BuildError> {
        Ok(Arc::new(StoreMetadataUseCase::new(
            self.metadata_repository()?,
        )))
    }

    pub fn build_runner(&self) -> Result<PipelineRunner, BuildError> {
        let policy = RetryPolicy::new(
            self.config.pipeline_max_attempts,
            self.config.pipeline_retry_base(),
        );
        Ok(PipelineRunner::new(
            self.build_extract()?,
            self.build_store()?,
            policy,
        ))
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
