//! CLI entry point for the automotive open-data ETL pipeline.
//!
//! Provides subcommands for each pipeline stage (acquire, clean, integrate,
//! validate, load) plus a driver that runs them in strict order, aborting on
//! the first stage failure.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use auto_data_etl::config::DataPaths;
use auto_data_etl::{acquire, clean, integrate, load, validate};

#[derive(Parser)]
#[command(name = "auto_data_etl")]
#[command(about = "Batch ETL pipeline for automotive open data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the three raw datasets into data/raw
    Acquire,
    /// Clean one raw source (or all of them) into data/processed
    Clean {
        #[arg(value_enum, default_value_t = CleanSource::All)]
        source: CleanSource,
    },
    /// Join the cleaned datasets into the three analytical tables
    Integrate,
    /// Check the integrated tables against the documented expectations
    Validate,
    /// Simulate loading the integrated tables into the warehouse
    Load,
    /// Run the full pipeline: acquire, clean, integrate, validate, load
    Run {
        /// Skip acquisition and reuse existing raw files
        #[arg(long, default_value_t = false)]
        skip_acquire: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CleanSource {
    Epa,
    Nhtsa,
    Doe,
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/auto_data_etl.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("auto_data_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let paths = DataPaths::from_env();

    match cli.command {
        Commands::Acquire => acquire::run(&paths).await?,
        Commands::Clean { source } => {
            paths.ensure_layout()?;
            run_clean(&paths, source)?;
        }
        Commands::Integrate => {
            paths.ensure_layout()?;
            integrate::run(&paths)?;
        }
        Commands::Validate => validate::run(&paths)?,
        Commands::Load => load::run(&paths)?,
        Commands::Run { skip_acquire } => {
            paths.ensure_layout()?;

            if skip_acquire {
                info!("Skipping acquisition, using existing raw files");
            } else {
                acquire::run(&paths).await?;
            }

            run_clean(&paths, CleanSource::All)?;
            integrate::run(&paths)?;
            validate::run(&paths)?;
            load::run(&paths)?;

            info!("Pipeline complete");
        }
    }

    Ok(())
}

fn run_clean(paths: &DataPaths, source: CleanSource) -> Result<()> {
    match source {
        CleanSource::Epa => clean::epa::run(paths)?,
        CleanSource::Nhtsa => clean::nhtsa::run(paths)?,
        CleanSource::Doe => clean::doe::run(paths)?,
        CleanSource::All => {
            clean::epa::run(paths)?;
            clean::nhtsa::run(paths)?;
            clean::doe::run(paths)?;
        }
    }
    Ok(())
}
