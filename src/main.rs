//! mgnrega-dash - MGNREGA dashboard backend
//!
//! Main entry point for the server and the one-shot query tools.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mgnrega_dash::aggregator::Aggregator;
use mgnrega_dash::cache::Cache;
use mgnrega_dash::config::{validate_config_result, ServiceArgs, ServiceConfig};
use mgnrega_dash::records::Filters;
use mgnrega_dash::server::{ApiServer, RecordsResponse};
use mgnrega_dash::upstream::DataGovClient;
use std::process;

/// mgnrega-dash - Caching proxy for MGNREGA district statistics
#[derive(Parser, Debug)]
#[command(name = "mgnrega-dash")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Run the pipeline once and print the JSON response
    Query {
        /// State name, e.g. BIHAR
        #[arg(short, long)]
        state: Option<String>,

        /// District name, e.g. PATNA
        #[arg(short, long)]
        district: Option<String>,

        /// Financial year, e.g. 2023-2024
        #[arg(short, long)]
        year: Option<String>,
    },

    /// Show cache statistics
    Stats,
}

fn main() {
    if let Err(e) = mgnrega_dash::logging::init("info") {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> mgnrega_dash::Result<()> {
    let config = ServiceConfig::from(cli.service);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            validate_config_result(&config)?;
            runtime()?.block_on(serve(&config))
        }
        Commands::Query {
            state,
            district,
            year,
        } => {
            validate_config_result(&config)?;
            let filters = Filters {
                state,
                district,
                year,
            };
            runtime()?.block_on(query(&config, &filters))
        }
        Commands::Stats => handle_stats_command(&config),
    }
}

fn runtime() -> mgnrega_dash::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new().context("Failed to start async runtime")?)
}

fn open_cache(config: &ServiceConfig) -> mgnrega_dash::Result<Cache> {
    Ok(Cache::new(config.cache())
        .with_context(|| format!("Failed to open cache at {}", config.database.display()))?)
}

fn build_aggregator(config: &ServiceConfig) -> mgnrega_dash::Result<Aggregator> {
    let cache = open_cache(config)?;
    let client =
        DataGovClient::new(config.upstream()).context("Failed to build upstream client")?;
    Ok(Aggregator::new(cache, client))
}

async fn serve(config: &ServiceConfig) -> mgnrega_dash::Result<()> {
    tracing::info!(
        database = %config.database.display(),
        upstream = %config.upstream_url,
        "Starting MGNREGA proxy"
    );

    let aggregator = build_aggregator(config)?;
    ApiServer::new(aggregator).run(&config.listen_addr()).await
}

async fn query(config: &ServiceConfig, filters: &Filters) -> mgnrega_dash::Result<()> {
    let aggregator = build_aggregator(config)?;
    let records = aggregator.fetch_and_aggregate(filters).await?;

    let output = serde_json::to_string_pretty(&RecordsResponse { records })?;
    println!("{}", output);
    Ok(())
}

fn handle_stats_command(config: &ServiceConfig) -> mgnrega_dash::Result<()> {
    if config.database.as_os_str().is_empty() {
        return Err(mgnrega_dash::MgnregaError::Config(
            "Cache database path is required (set MGNREGA_DATABASE or --database)".to_string(),
        ));
    }

    let cache = open_cache(config)?;
    let stats = cache.stats()?;

    println!("Cache: {}", cache.path().display());
    println!("  Rows:   {}", stats.row_count);
    println!("  States: {}", stats.state_count);
    match stats.last_cached_at {
        Some(at) => println!("  Last cached: {}", at),
        None => println!("  Last cached: never"),
    }

    Ok(())
}
