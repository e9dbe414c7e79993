use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use sqlx::Row;
use std::env;

#[derive(Parser)]
struct Cli {
    #[arg(long)]
    database_url: Option<String>,

    /// Delete extra copies of identical rows, keeping one
    #[arg(long)]
    dedupe: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let db_url = cli
        .database_url
        .or_else(|| env::var("SqlConnectionString").ok())
        .or_else(|| env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("SqlConnectionString or DATABASE_URL must be set, or pass --database-url")
        })?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await?;

    // Rows the pipeline would never have written
    let invalid_rows = sqlx::query(
        r#"SELECT "FileName", "FileSizeKB"::float8 AS size_kb, "Width", "Height"
           FROM "ImageMetadata"
           WHERE "FileName" = '' OR "Width" <= 0 OR "Height" <= 0 OR "FileSizeKB" < 0"#,
    )
    .fetch_all(&pool)
    .await?;

    println!("Invalid rows: {}", invalid_rows.len());
    for r in invalid_rows.iter() {
        let file_name: String = r.get("FileName");
        let size_kb: f64 = r.get("size_kb");
        let width: i32 = r.get("Width");
        let height: i32 = r.get("Height");
        println!(
            "file: {:?}, size_kb: {}, width: {}, height: {}",
            file_name, size_kb, width, height
        );
    }

    // Identical rows left behind by retried store activities
    let duplicate_groups = sqlx::query(
        r#"SELECT "FileName", "FileSizeKB"::float8 AS size_kb, "Width", "Height", "Format",
                  COUNT(*) AS copies
           FROM "ImageMetadata"
           GROUP BY "FileName", "FileSizeKB", "Width", "Height", "Format"
           HAVING COUNT(*) > 1"#,
    )
    .fetch_all(&pool)
    .await?;

    println!("Duplicate groups: {}", duplicate_groups.len());
    for r in duplicate_groups.iter() {
        let file_name: String = r.get("FileName");
        let format: Option<String> = r.get("Format");
        let copies: i64 = r.get("copies");
        println!("file: {:?}, format: {:?}, copies: {}", file_name, format, copies);
    }

    if cli.dedupe && !duplicate_groups.is_empty() {
        let removed = sqlx::query(
            r#"DELETE FROM "ImageMetadata" a
               USING "ImageMetadata" b
               WHERE a.ctid > b.ctid
                 AND a."FileName" = b."FileName"
                 AND a."FileSizeKB" = b."FileSizeKB"
                 AND a."Width" = b."Width"
                 AND a."Height" = b."Height"
                 AND a."Format" IS NOT DISTINCT FROM b."Format""#,
        )
        .execute(&pool)
        .await?
        .rows_affected();
        println!("Removed {} duplicate rows", removed);
    }

    Ok(())
}
