use anyhow::Result;
use clap::Parser;
use mooney_scout::notify::LogNotifier;
use mooney_scout::scrapers::{
    AirplaneMartScraper, AsoScraper, ControllerScraper, SourceAdapter, TradeAPlaneScraper,
};
use mooney_scout::{MemoryStore, Pipeline, RecordStore, SourceConfig, SourceJob, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scrapes the web for aircraft sales listings.
#[derive(Parser, Debug)]
#[command(name = "mooney-scout", version, about)]
struct Args {
    /// Path to the listings database.
    #[arg(long, default_value = "mooney.db")]
    db: PathBuf,

    /// Seed URL configuration (JSON). Built-in searches when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum per-source interval between requests, in milliseconds.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Scrape without persisting (in-memory store).
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => SourceConfig::load(path)?,
        None => SourceConfig::default(),
    };

    let store: Arc<dyn RecordStore> = if args.dry_run {
        info!("Dry run: listings will not be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&args.db)?)
    };

    let jobs = vec![
        job(ControllerScraper::new()?, config.controller),
        job(TradeAPlaneScraper::new()?, config.trade_a_plane),
        job(AsoScraper::new()?, config.aso),
        job(AirplaneMartScraper::new()?, config.airplane_mart),
    ];

    info!("Starting scrape.");
    let pipeline = Pipeline::new(store, Duration::from_millis(args.delay_ms));
    let report = pipeline.run(jobs, &LogNotifier).await;

    info!(
        new = report.new_listings.len(),
        skipped = report.skipped,
        failed_items = report.failed_items,
        failed_sources = report.failed_sources,
        "Scrape complete."
    );

    Ok(())
}

fn job(adapter: impl SourceAdapter + 'static, seed_urls: Vec<String>) -> SourceJob {
    SourceJob {
        adapter: Arc::new(adapter),
        seed_urls,
    }
}
