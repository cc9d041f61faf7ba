//! shelf-etl - Book metadata reconciliation pipeline
//!
//! Subcommands:
//! - `work`: process one batch of PENDING jobs
//! - `publish`: enqueue jobs from a curated CSV file
//! - `requeue`: return FAILED jobs to PENDING with a fresh retry budget

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelf_common::config::ConfigOverrides;
use shelf_common::PipelineConfig;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelf_etl::db::{self, jobs};
use shelf_etl::source::{GoogleBooksClient, OpenLibraryClient};
use shelf_etl::{publisher, JobStatus, Worker};

/// Command-line arguments for shelf-etl
#[derive(Parser, Debug)]
#[command(name = "shelf-etl")]
#[command(about = "Book metadata reconciliation pipeline")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database holding the job queue and warehouse
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one batch of PENDING jobs
    Work {
        /// Maximum jobs pulled in this run
        #[arg(long)]
        batch_size: Option<usize>,

        /// Total processing attempts per job
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Create PENDING jobs from a Title,Author[,ISBN] CSV file
    Publish {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Reset FAILED jobs to PENDING
    Requeue,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let (batch_size, retry_max_attempts) = match &self.command {
            Command::Work {
                batch_size,
                max_retries,
            } => (*batch_size, *max_retries),
            _ => (None, None),
        };

        ConfigOverrides {
            config_file: self.config.clone(),
            database_path: self.database.clone(),
            batch_size,
            retry_max_attempts,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Configuration first: it supplies the fallback log filter
    let config = PipelineConfig::resolve(&args.overrides()).context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting shelf-etl {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database: {}", config.database_path.display());

    let pool = db::init_database_pool(&config.database_path)
        .await
        .context("Failed to open database")?;

    let code = match args.command {
        Command::Work { .. } => {
            let google_books = Arc::new(GoogleBooksClient::new(&config)?);
            let open_library = Arc::new(OpenLibraryClient::new(&config)?);
            let worker = Worker::new(pool.clone(), google_books, open_library, &config);

            let summary = worker.run_batch().await.context("Batch run failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            ExitCode::SUCCESS
        }
        Command::Publish { csv } => {
            let summary = publisher::publish_csv(&pool, &csv).await?;
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                warn!("Publish finished with errors: {}", summary.display_string());
                ExitCode::FAILURE
            }
        }
        Command::Requeue => {
            let reset = jobs::reset_failed(&pool).await?;
            let pending = jobs::count_by_status(&pool, JobStatus::Pending).await?;
            info!(reset, pending, "FAILED jobs returned to queue");
            ExitCode::SUCCESS
        }
    };

    pool.close().await;
    Ok(code)
}
