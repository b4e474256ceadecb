//! Zoocrawl main entry point
//!
//! Command-line interface for the catalog crawler: pick a walk mode,
//! point it at a configuration file, and let the restart policy retry
//! the whole operation on failure.

use clap::Parser;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zoocrawl::config::load_config;
use zoocrawl::crawler::{run_catalog_walk, run_products_walk, run_with_restarts};

/// Zoocrawl: a catalog crawler for a single pet-supplies store
///
/// Walks either the category tree (--catalogs) or the paginated product
/// listings (--products) and writes the extracted records as CSV into the
/// configured output directory.
#[derive(Parser, Debug)]
#[command(name = "zoocrawl")]
#[command(version = "1.0.0")]
#[command(about = "Catalog and product crawler", long_about = None)]
#[command(group = clap::ArgGroup::new("mode").required(true).args(["catalogs", "products"]))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Walk the category tree
    #[arg(long)]
    catalogs: bool,

    /// Walk the paginated product listings
    #[arg(long)]
    products: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration before setting up file logging,
    // since the log directory comes from the config
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _guard = setup_logging(&config.logs.directory, cli.verbose, cli.quiet)?;
    tracing::info!("configuration loaded from {}", cli.config.display());

    let scoped = config.crawler.category_filter();
    if !scoped.is_empty() {
        tracing::info!("category scope configured (not yet applied): {:?}", scoped);
    }

    let result = if cli.catalogs {
        tracing::info!("starting category walk");
        run_with_restarts(&config.restart, || run_catalog_walk(&config)).await
    } else {
        tracing::info!("starting product walk");
        run_with_restarts(&config.restart, || run_products_walk(&config)).await
    };

    match result {
        Ok(()) => {
            tracing::info!("walk completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("walk failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up console logging plus a daily-rolling log file in `logs_dir`
fn setup_logging(logs_dir: &str, verbose: u8, quiet: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("zoocrawl=info,warn"),
            1 => EnvFilter::new("zoocrawl=debug,info"),
            2 => EnvFilter::new("zoocrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_appender = tracing_appender::rolling::daily(logs_dir, "zoocrawl.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}
