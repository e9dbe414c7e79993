//! Integration tests using TestContainers
//!
//! Runs the whole pipeline against a real PostgreSQL container with the
//! bundled migrations applied. Needs a Docker daemon, so these are opt-in:
//! `cargo test --test testcontainers_integration -- --ignored`.


use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};

use image_metadata_pipeline::application::{
    builder::ApplicationBuilder,
    pipeline::PipelineRunner,
    ports::WriteOutcome,
};
use image_metadata_pipeline::config::BlobBackend;
use image_metadata_pipeline::domain::value_objects::WriteMode;
use image_metadata_pipeline::{Classify, Config, ErrorKind};
use test_fixtures::{jpeg_of_len, SeededStore};

/// Test environment using TestContainers
struct TestEnvironment {
    pool: PgPool,
    database_url: String,
    seeded: SeededStore,
    _container: testcontainers::ContainerAsync<Postgres>,
}

impl TestEnvironment {
    async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let host = container.get_host().await.expect("Failed to get container host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get container port");

        let database_url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            database_url,
            seeded: SeededStore::new(),
            _container: container,
        }
    }

    fn runner(&self, write_mode: WriteMode) -> PipelineRunner {
        let config = Config {
            blob_backend: BlobBackend::Local,
            database_url: Some(self.database_url.clone()),
            write_mode,
            pipeline_retry_base_ms: 10,
            ..Config::default()
        };

        ApplicationBuilder::new(config)
            .with_blob_store(self.seeded.store.clone())
            .build_runner()
            .expect("Failed to build pipeline runner")
    }

    async fn rows_for(&self, file_name: &str) -> i64 {
        sqlx::query(r#"SELECT COUNT(*) AS n FROM "ImageMetadata" WHERE "FileName" = $1"#)
            .bind(file_name)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows")
            .get("n")
    }
}

/// Full extract and store with testcontainers
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pipeline_with_testcontainers() {
    let env = TestEnvironment::new().await;
    env.seeded
        .put("images-input/pets.jpeg", &jpeg_of_len(300, 200, 512_000))
        .await;

    let outcome = env
        .runner(WriteMode::Append)
        .run("images-input/pets.jpeg")
        .await
        .expect("Pipeline run failed");

    assert_eq!(outcome.write, WriteOutcome::Inserted);

    let row = sqlx::query(
        r#"SELECT "FileName", "FileSizeKB"::float8 AS size_kb, "Width", "Height", "Format"
           FROM "ImageMetadata""#,
    )
    .fetch_one(&env.pool)
    .await
    .expect("Row should exist");

    assert_eq!(row.get::<String, _>("FileName"), "pets.jpeg");
    assert_eq!(row.get::<f64, _>("size_kb"), 500.0);
    assert_eq!(row.get::<i32, _>("Width"), 300);
    assert_eq!(row.get::<i32, _>("Height"), 200);
    assert_eq!(row.get::<Option<String>, _>("Format").as_deref(), Some("JPEG"));
}

/// Re-running a blob in skip-duplicate mode leaves a single row
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_rerun_is_idempotent_in_skip_duplicate_mode() {
    let env = TestEnvironment::new().await;
    env.seeded
        .put("images-input/cat.jpeg", &jpeg_of_len(64, 48, 8192))
        .await;
    let runner = env.runner(WriteMode::SkipDuplicate);

    let first = runner.run("images-input/cat.jpeg").await.unwrap();
    let second = runner.run("images-input/cat.jpeg").await.unwrap();

    assert_eq!(first.write, WriteOutcome::Inserted);
    assert_eq!(second.write, WriteOutcome::SkippedDuplicate);
    assert_eq!(env.rows_for("cat.jpeg").await, 1);
}

/// Stopping the database surfaces a retryable failure and writes nothing
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_database_outage_is_retryable() {
    let env = TestEnvironment::new().await;
    env.seeded
        .put("images-input/dog.jpeg", &jpeg_of_len(32, 32, 4096))
        .await;

    let config = Config {
        database_url: Some(env.database_url.clone()),
        db_acquire_timeout_secs: 2,
        pipeline_max_attempts: 2,
        pipeline_retry_base_ms: 10,
        ..Config::default()
    };
    let runner = ApplicationBuilder::new(config)
        .with_blob_store(env.seeded.store.clone())
        .build_runner()
        .unwrap();

    env._container.stop().await.expect("Failed to stop container");

    let err = tokio::time::timeout(Duration::from_secs(60), runner.run("images-input/dog.jpeg"))
        .await
        .expect("Pipeline should give up within the retry budget")
        .unwrap_err();

    assert!(err.kind() == ErrorKind::StoreUnavailable || err.kind() == ErrorKind::Timeout);
    assert_eq!(err.attempts(), 2);
}
