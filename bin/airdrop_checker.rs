//! # Airdrop Checker CLI
//!
//! Synchronizes the airdrop index and payloads, then prints the airdrops the
//! given addresses are eligible for as JSON.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin airdrop_checker -- 0x2B888954421b424C5D3D9Ce9bB67c9bD47537d12 --tolerance 0.1
//! ```
//!
//! Uses PostgreSQL for the cache and history events when `DATABASE_URL` (or
//! `database.url` in `Config.toml`) is set, in-memory stores otherwise. Token
//! assets resolve against the built-in airdrop tokens plus `[[assets]]` entries
//! of `Config.toml`.

use airdrop_checker::{
    assets::MemoryAssetCatalog,
    cache::{CacheStore, MemoryCacheStore},
    database::{self, PgCacheStore, PgHistoryEvents},
    history::{HistoryEventsStore, MemoryHistoryEvents},
    http_client::ReqwestFetcher,
    messages::MessagesAggregator,
    metrics,
    settings::Settings,
    types::{checksummed, conversions::string_to_address},
    AirdropChecker,
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "airdrop_checker", about = "Check airdrop eligibility of Ethereum addresses")]
struct Args {
    /// Addresses to check
    #[arg(required_unless_present = "metadata_only")]
    addresses: Vec<String>,

    /// Upward tolerance when matching claim amounts (defaults to the configured one)
    #[arg(long)]
    tolerance: Option<String>,

    /// Overrides the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Only list the airdrops of the index
    #[arg(long)]
    metadata_only: bool,

    /// Serves Prometheus metrics on this address (e.g. 0.0.0.0:9000)
    #[cfg(feature = "observability")]
    #[arg(long)]
    metrics_addr: Option<std::net::SocketAddr>,
}

#[cfg(feature = "observability")]
fn init_metrics(args: &Args) -> Result<()> {
    match args.metrics_addr {
        Some(addr) => metrics::init_prometheus_exporter(addr),
        None => {
            metrics::describe_metrics();
            Ok(())
        }
    }
}

#[cfg(not(feature = "observability"))]
fn init_metrics(_args: &Args) -> Result<()> {
    metrics::describe_metrics();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut settings = Settings::new()?;
    if let Some(data_dir) = &args.data_dir {
        settings.data_dir = data_dir.clone();
    }
    let tolerance = match &args.tolerance {
        Some(raw) => Decimal::from_str(raw).with_context(|| format!("invalid tolerance {}", raw))?,
        None => settings.airdrops.tolerance,
    };

    let addresses = args
        .addresses
        .iter()
        .map(|a| string_to_address(a).with_context(|| format!("invalid address {}", a)))
        .collect::<Result<Vec<_>>>()?;

    init_metrics(&args)?;

    let (cache, events): (Arc<dyn CacheStore>, Arc<dyn HistoryEventsStore>) =
        if settings.database.url.is_some() {
            let pool = database::connect(&settings.database).await?;
            let schema = settings.database.schema.clone();
            (
                Arc::new(PgCacheStore::new(pool.clone(), schema.clone())),
                Arc::new(PgHistoryEvents::new(pool, schema)),
            )
        } else {
            log::info!("No database configured, using in-memory stores");
            (
                Arc::new(MemoryCacheStore::new()),
                Arc::new(MemoryHistoryEvents::new()),
            )
        };

    let http = Arc::new(ReqwestFetcher::new(Duration::from_secs(
        settings.airdrops.timeout_seconds,
    ))?);
    let messages = Arc::new(MessagesAggregator::new());
    let assets = Arc::new(MemoryAssetCatalog::seeded(&settings.assets));
    let checker = AirdropChecker::new(
        settings,
        http,
        cache,
        assets,
        events,
        messages.clone(),
    );

    if args.metadata_only {
        let metadata = checker.fetch_airdrops_metadata().await?;
        for (protocol, record) in &metadata.airdrops {
            println!("{} {} ({})", "airdrop".cyan(), protocol.bold(), record.name);
        }
        for (protocol, record) in &metadata.poap_airdrops {
            println!("{} {} ({})", "poap".cyan(), protocol.bold(), record.name);
        }
    } else {
        let result = checker.check_airdrops(&addresses, tolerance).await?;
        println!("{}", serde_json::to_string_pretty(&checksummed(&result))?);
    }

    for warning in messages.consume_warnings() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in messages.consume_errors() {
        eprintln!("{} {}", "error:".red().bold(), error);
    }
    Ok(())
}
