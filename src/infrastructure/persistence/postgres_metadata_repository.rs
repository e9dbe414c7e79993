use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::ports::{MetadataRepository, RepositoryError, WriteOutcome};
use crate::domain::entities::ImageMetadata;
use crate::domain::value_objects::{SizeKb, WriteMode};
use crate::infrastructure::persistence::QueryBuilder;

/// Postgres-backed metadata store.
///
/// Each insert checks one connection out of the pool inside a transaction.
/// The transaction rolls back and the connection returns to the pool when the
/// future completes, fails, or is dropped mid-flight.
pub struct PostgresMetadataRepository {
    pool: PgPool,
    write_mode: WriteMode,
    write_timeout: Duration,
}

impl PostgresMetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_options(pool, WriteMode::default(), Duration::from_secs(30))
    }

    pub fn with_options(pool: PgPool, write_mode: WriteMode, write_timeout: Duration) -> Self {
        Self {
            pool,
            write_mode,
            write_timeout,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_in_transaction(
        &self,
        params: &InsertParams<'_>,
    ) -> Result<WriteOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(QueryBuilder::SET_STATEMENT_TIMEOUT)
            .bind(self.write_timeout.as_millis().to_string())
            .execute(&mut *tx)
            .await?;

        let sql = match self.write_mode {
            WriteMode::Append => QueryBuilder::INSERT,
            WriteMode::SkipDuplicate => QueryBuilder::INSERT_IF_ABSENT,
        };

        let result = sqlx::query(sql)
            .bind(params.file_name)
            .bind(params.size_kb)
            .bind(params.width)
            .bind(params.height)
            .bind(params.format)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(if result.rows_affected() == 0 {
            WriteOutcome::SkippedDuplicate
        } else {
            WriteOutcome::Inserted
        })
    }
}

struct InsertParams<'a> {
    file_name: &'a str,
    size_kb: f64,
    width: i32,
    height: i32,
    format: Option<&'a str>,
}

impl<'a> InsertParams<'a> {
    fn from_domain(metadata: &'a ImageMetadata) -> Result<Self, RepositoryError> {
        let to_column = |value: u32, column: &str| {
            i32::try_from(value).map_err(|_| {
                RepositoryError::ConstraintViolation(format!(
                    "{} {} exceeds the integer column range",
                    column, value
                ))
            })
        };

        Ok(Self {
            file_name: metadata.file_name(),
            size_kb: metadata.size_kb().value(),
            width: to_column(metadata.width(), "Width")?,
            height: to_column(metadata.height(), "Height")?,
            format: metadata.format(),
        })
    }
}

#[async_trait]
impl MetadataRepository for PostgresMetadataRepository {
    async fn insert(&self, metadata: &ImageMetadata) -> Result<WriteOutcome, RepositoryError> {
        let params = InsertParams::from_domain(metadata)?;

        let outcome = match tokio::time::timeout(
            self.write_timeout,
            self.insert_in_transaction(&params),
        )
        .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(RepositoryError::Timeout(_))) | Err(_) => {
                warn!(
                    file_name = metadata.file_name(),
                    "Metadata insert exceeded {:?}", self.write_timeout
                );
                return Err(RepositoryError::Timeout(self.write_timeout));
            }
            Ok(Err(e)) => return Err(e),
        };

        debug!(
            file_name = metadata.file_name(),
            mode = %self.write_mode,
            ?outcome,
            "Metadata row written"
        );

        Ok(outcome)
    }

    async fn find_by_file_name(
        &self,
        file_name: &str,
    ) -> Result<Vec<ImageMetadata>, RepositoryError> {
        let rows = sqlx::query_as::<_, MetadataRow>(&QueryBuilder::select_by_file_name())
            .bind(file_name)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MetadataRow::into_domain).collect()
    }
}

#[derive(sqlx::FromRow)]
struct MetadataRow {
    file_name: String,
    size_kb: f64,
    width: i32,
    height: i32,
    format: Option<String>,
}

impl MetadataRow {
    fn into_domain(self) -> Result<ImageMetadata, RepositoryError> {
        let to_dimension = |value: i32| {
            u32::try_from(value)
                .map_err(|_| RepositoryError::SerializationError(format!("dimension {}", value)))
        };

        let size_kb = SizeKb::new(self.size_kb)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        ImageMetadata::new(
            self.file_name,
            size_kb,
            to_dimension(self.width)?,
            to_dimension(self.height)?,
            self.format,
        )
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}
