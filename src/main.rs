//! asset-migrate - bulk asset migration runner

use anyhow::Context;
use asset_migrate::config::LoggingConfig;
use asset_migrate::utils::logging::init_logging;
use asset_migrate::{Config, Migration, MigrationContext, ReportGenerator};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "asset-migrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate every row of the configured source
    Run(RunArgs),

    /// Project a run log into a CSV report
    Report(ReportArgs),
}

#[derive(Args)]
struct RunArgs {
    /// YAML configuration file
    #[arg(short, long, env = "MIGRATE_CONFIG", default_value = "config/migrate.yaml")]
    config: PathBuf,

    /// Override the number of records processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Override the run log path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Override the input CSV path
    #[arg(long)]
    source: Option<PathBuf>,
}

#[derive(Args)]
struct ReportArgs {
    /// Run log (JSON Lines) to read
    #[arg(short, long)]
    log: PathBuf,

    /// CSV file to write
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Report(args) => report(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn failure_message(error: &anyhow::Error) -> String {
    format!("Error: {:#}", error)
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::from_file(&args.config)
        .await
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.apply_process_env()?;

    if let Some(concurrency) = args.concurrency {
        config.migration.run.concurrency = concurrency;
    }
    if let Some(log_file) = args.log_file {
        config.migration.run.log_file = log_file;
    }
    if let Some(source) = args.source {
        config.migration.source.path = source;
    }

    init_logging(config.logging());
    config.validate()?;

    let log_file = config.run().log_file.clone();
    let context = MigrationContext::from_config(config).await?;
    let migration = Migration::prepare(context)
        .await
        .context("preparing migration")?;
    let stats = migration.run().await?;

    info!(
        run_id = %migration.run_id(),
        "Processed {} records: {} succeeded, {} failed; log at {}",
        stats.attempted,
        stats.succeeded,
        stats.failed,
        log_file.display()
    );
    Ok(())
}

fn report(args: ReportArgs) -> anyhow::Result<()> {
    init_logging(&LoggingConfig::default());

    let summary = ReportGenerator::new()
        .generate(&args.log, &args.output)
        .with_context(|| format!("generating report from {}", args.log.display()))?;

    info!(
        "Wrote {} rows ({} succeeded, {} failed) to {}",
        summary.rows,
        summary.succeeded,
        summary.failed,
        args.output.display()
    );
    Ok(())
}
