//! jobmeter main entry point
//!
//! This is the command-line interface for the jobmeter harvester.

use anyhow::Context;
use clap::Parser;
use jobmeter::config::{apply_env_overrides, load_config_with_hash, Config};
use jobmeter::crawler::{build_scraper, SOURCES};
use jobmeter::proxy::{build_pool, API_KEY_VAR};
use jobmeter::storage::{export_json, open_store, JobStore};
use jobmeter::{JobRecord, ResilientClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Hash recorded for runs that use the built-in defaults
const DEFAULT_CONFIG_HASH: &str = "defaults";

/// Number of titles echoed after a harvest
const PREVIEW_COUNT: usize = 5;

/// jobmeter: an incremental job-posting harvester
///
/// jobmeter walks a job board's search results newest-first, stores every
/// posting it has not seen before and stops once it reaches postings
/// harvested by an earlier run.
#[derive(Parser, Debug)]
#[command(name = "jobmeter")]
#[command(version = "1.0.0")]
#[command(about = "An incremental job-posting harvester", long_about = None)]
struct Cli {
    /// Website to harvest (e.g. kariyernet)
    #[arg(value_name = "WEBSITE", required_unless_present = "stats")]
    website: Option<String>,

    /// Maximum number of new jobs to collect
    #[arg(long, value_name = "N", alias = "max_jobs")]
    max_jobs: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write every stored job to this JSON file after harvesting
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Show store statistics and exit without harvesting
    #[arg(long)]
    stats: bool,

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

    setup_logging(cli.verbose, cli.quiet);

    if dotenvy::dotenv().is_ok() {
        tracing::debug!("Loaded environment from .env");
    }

    let (config, config_hash) = load_configuration(cli.config.as_ref())?;

    let mut store = open_store(std::path::Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))?;

    if cli.stats {
        return print_stats(&store);
    }

    let Some(website) = cli.website.as_deref() else {
        anyhow::bail!("No website given");
    };
    if !SOURCES.contains(&website) {
        anyhow::bail!(
            "Unknown website '{}' (available: {})",
            website,
            SOURCES.join(", ")
        );
    }

    let run_id = store.create_run(website, &config_hash)?;
    tracing::info!("Started run {} for {}", run_id, website);

    let harvested = harvest(website, cli.max_jobs, &config, &store).await;
    let (records, added) = finish_run(&mut store, run_id, harvested)?;

    println!("Harvested {} new jobs from {}", added, website);
    for record in records.iter().take(PREVIEW_COUNT) {
        println!("  - {} ({})", record.title, record.company);
    }
    println!("Store now holds {} jobs", store.size()?);

    if let Some(path) = &cli.export {
        let count = export_json(&store, path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("Exported {} jobs to {}", count, path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobmeter=info,warn"),
            1 => EnvFilter::new("jobmeter=debug,info"),
            2 => EnvFilter::new("jobmeter=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            tracing::info!("No configuration file given, using defaults");
            Ok((config, DEFAULT_CONFIG_HASH.to_string()))
        }
    }
}

/// Builds the proxy pool, client and scraper, then runs one crawl
async fn harvest(
    website: &str,
    max_jobs: Option<usize>,
    config: &Config,
    store: &dyn JobStore,
) -> anyhow::Result<Vec<JobRecord>> {
    let pool = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => {
            let provider_client = jobmeter::http::build_http_client(&config.http, None)?;
            Some(Arc::new(build_pool(&config.proxy, provider_client, key.trim())))
        }
        _ => {
            if config.kariyernet.proxied {
                tracing::warn!("{} is not set, proxied requests will go direct", API_KEY_VAR);
            }
            None
        }
    };

    let client = Arc::new(ResilientClient::new(&config.http, pool)?);
    let scraper = build_scraper(website, config, client)?;

    let seen_ids = store.recent_ids(scraper.name())?;
    tracing::info!("{} jobs already known for {}", seen_ids.len(), scraper.name());

    let records = scraper.scrape(seen_ids, max_jobs).await?;
    Ok(records)
}

/// Stores the records of a crawl and closes its run
///
/// The run is marked failed if the crawl failed or if storing its records
/// or completing the run failed.
///
/// # Returns
///
/// * `Ok((records, added))` - Harvested records and how many were new
/// * `Err(anyhow::Error)` - The first failure, after the run was marked failed
fn finish_run(
    store: &mut dyn JobStore,
    run_id: i64,
    harvested: anyhow::Result<Vec<JobRecord>>,
) -> anyhow::Result<(Vec<JobRecord>, u64)> {
    let outcome = harvested.and_then(|records| {
        let added = store_records(store, &records)?;
        store.complete_run(run_id, added)?;
        Ok((records, added))
    });

    if let Err(e) = &outcome {
        tracing::error!("Harvest failed: {:#}", e);
        store.fail_run(run_id, &format!("{:#}", e))?;
    }

    outcome
}

/// Persists harvested records, returning how many were new to the store
fn store_records(store: &mut dyn JobStore, records: &[JobRecord]) -> anyhow::Result<u64> {
    let mut added = 0;
    for record in records {
        if store.add_record(record)? {
            added += 1;
        }
    }
    Ok(added)
}

/// Handles --stats: prints store size and the latest run
fn print_stats(store: &dyn JobStore) -> anyhow::Result<()> {
    println!("=== jobmeter store ===\n");
    println!("Jobs stored: {}", store.size()?);

    match store.latest_run()? {
        Some(run) => {
            println!("\nLatest run #{} ({})", run.id, run.website);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            if let Some(new_jobs) = run.new_jobs {
                println!("  New jobs: {}", new_jobs);
            }
            if let Some(message) = &run.error_message {
                println!("  Error: {}", message);
            }
        }
        None => println!("\nNo runs recorded yet"),
    }

    Ok(())
}
