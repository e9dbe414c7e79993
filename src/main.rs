use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use image_metadata_pipeline::{
    application::builder::ApplicationBuilder,
    dto::{ExtractRequest, MetadataRecord},
    Classify, Config, ErrorKind,
};

/// Exit status for failures an orchestrator should retry (EX_TEMPFAIL)
const EXIT_RETRYABLE: u8 = 75;

#[derive(Parser)]
#[command(name = "image-metadata-pipeline", version, about = "Extract and store image metadata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract metadata for one blob and print the record as JSON
    Extract {
        /// "<container>/<object path>"
        #[arg(long)]
        blob_name: Option<String>,
    },
    /// Persist one metadata record given as JSON
    Store {
        #[arg(long)]
        record: String,
    },
    /// Run extract then store for one blob, retrying transient failures
    Run {
        #[arg(long)]
        blob_name: String,
    },
    /// Apply the bundled database migrations
    Migrate,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Report an activity failure on stdout and pick the exit status from its kind
fn report_failure(kind: ErrorKind, message: String) -> ExitCode {
    error!(%kind, "{}", message);
    println!(
        "{}",
        json!({
            "error": kind,
            "message": message,
            "retryable": kind.is_retryable(),
        })
    );
    if kind.is_retryable() {
        ExitCode::from(EXIT_RETRYABLE)
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let builder = ApplicationBuilder::new(config);

    match cli.command {
        Command::Extract { blob_name } => {
            let use_case = builder.build_extract()?;
            match use_case.execute(ExtractRequest { blob_name }).await {
                Ok(record) => {
                    println!("{}", serde_json::to_string(&record)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report_failure(e.kind(), e.to_string())),
            }
        }
        Command::Store { record } => {
            let record: MetadataRecord =
                serde_json::from_str(&record).context("Record is not valid JSON")?;
            let use_case = builder.build_store()?;
            match use_case.execute(record).await {
                Ok(outcome) => {
                    println!("{}", json!({ "outcome": format!("{:?}", outcome) }));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report_failure(e.kind(), e.to_string())),
            }
        }
        Command::Run { blob_name } => {
            let runner = builder.build_runner()?;
            match runner.run(&blob_name).await {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string(&outcome.record)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report_failure(e.kind(), e.to_string())),
            }
        }
        Command::Migrate => {
            let pool = builder.lazy_pool()?;
            info!("Running database migrations");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            pool.close().await;
            info!("Migrations applied");
            Ok(ExitCode::SUCCESS)
        }
    }
}
