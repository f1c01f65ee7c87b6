//! ws-cardlist - crawl one series/product of the card list into JSON documents

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{info, warn};

use ws_cardlist_lib::application::{
    CrawlContext, CrawlDriver, CrawlReport, GroupingResolver, ProductAggregator, run_crawl,
};
use ws_cardlist_lib::domain::{CatalogFilter, CatalogSource};
use ws_cardlist_lib::infrastructure::{
    AppConfig, CardRowParser, ConfigManager, HttpCatalogSource, HttpClient, HttpClientConfig, HttpImageStore,
    ProductJsonWriter, SnapshotCatalogSource, init_logging_with_config,
};

/// Command-line arguments for ws-cardlist
#[derive(Parser, Debug)]
#[command(name = "ws-cardlist")]
#[command(about = "Crawl the Weiss Schwarz card list into per-product JSON documents")]
#[command(version)]
struct Args {
    /// Series (title) name, exactly as the card list shows it
    #[arg(short, long)]
    series: String,

    /// Product (expansion) name, exactly as the card list shows it
    #[arg(short, long)]
    product: String,

    /// Configuration file; defaults to the per-user config directory
    #[arg(short, long, env = "WS_CARDLIST_CONFIG")]
    config: Option<PathBuf>,

    /// Replay saved result pages from this directory instead of the live site
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Override the product document directory
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Override the image root directory
    #[arg(long)]
    images_out: Option<PathBuf>,
}

impl Args {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.json_out {
            config.paths.json_output_dir.clone_from(dir);
        }
        if let Some(dir) = &self.images_out {
            config.paths.image_root_dir.clone_from(dir);
        }
    }
}

/// Shared crawl setup for either catalog source
async fn crawl<S: CatalogSource>(source: S, client: Arc<HttpClient>, config: &AppConfig) -> Result<CrawlReport> {
    let parser = CardRowParser::with_config(&config.parsing).context("Invalid parsing configuration")?;
    let aggregator = ProductAggregator::new(GroupingResolver::new(config.grouping.clone()));
    let mut driver = CrawlDriver::new(source, HttpImageStore::new(client), parser, aggregator);

    let mut ctx = CrawlContext::new(&config.paths.image_root_dir);
    let writer = ProductJsonWriter::new(&config.paths.json_output_dir);
    run_crawl(&mut driver, &mut ctx, &writer).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load_config().await?;
    args.apply_overrides(&mut config);
    config.sync_base_url();

    init_logging_with_config(&config.logging, &config.paths.log_dir)?;
    info!("Crawling {} / {}", args.series, args.product);
    info!("Configuration: {:?}", manager.config_path());

    let client = Arc::new(HttpClient::new(HttpClientConfig::from(&config.catalog))?);
    let filter = CatalogFilter::new(args.series.as_str(), args.product.as_str());

    let report = match &args.snapshots {
        Some(dir) => {
            let source = SnapshotCatalogSource::open(dir, &config.parsing).await?;
            crawl(source, client, &config).await?
        }
        None => {
            let source = HttpCatalogSource::open(client.clone(), &config.catalog, &config.parsing, &filter)
                .await
                .context("Failed to open the card list search")?;
            crawl(source, client, &config).await?
        }
    };

    let stats = report.stats;
    info!(
        "Pages: {}, rows: {} ({} skipped), merged variants: {}",
        stats.pages_visited, stats.rows_seen, stats.rows_skipped, stats.records_merged
    );
    info!("Images: {} saved, {} failed", stats.images_saved, stats.images_failed);
    info!(
        "Products: {}, records: {}, linked pairs: {}",
        report.product_count, report.record_count, report.link_count
    );
    for path in &report.written {
        info!("Wrote {}", path.display());
    }

    if let Some(message) = report.crawl_error {
        warn!("Partial results only");
        return Err(anyhow!("Crawl ended early: {message}"));
    }
    Ok(())
}
