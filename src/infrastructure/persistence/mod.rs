mod postgres_metadata_repository;
mod query_builder;

pub use postgres_metadata_repository::PostgresMetadataRepository;
pub use query_builder::QueryBuilder;
