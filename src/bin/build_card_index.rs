//! Build the flattened card index from the per-product JSON documents

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use ws_cardlist_lib::application::CatalogIndexBuilder;
use ws_cardlist_lib::infrastructure::config::LoggingConfig;
use ws_cardlist_lib::infrastructure::init_logging_with_config;

#[derive(Parser, Debug)]
#[command(name = "build_card_index")]
#[command(about = "Flatten product documents into a versioned card index")]
struct Args {
    /// Directory holding the `{productId}.json` documents
    #[arg(long)]
    data_dir: PathBuf,

    /// Directory receiving the index and its manifest
    #[arg(long)]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        file_output: false,
        ..LoggingConfig::default()
    };
    init_logging_with_config(&logging, &args.out_dir)?;

    let builder = CatalogIndexBuilder::new();
    let documents = builder.load_documents(&args.data_dir).await?;
    let index = builder.build(&documents, Utc::now())?;
    let manifest = builder.write(&index, &args.out_dir).await?;

    info!(
        "Index {} written: {} cards, {} products, {} traits, {} rarities",
        manifest.version,
        manifest.card_count,
        manifest.filter_options.product_count,
        manifest.filter_options.trait_count,
        manifest.filter_options.rarity_count
    );
    Ok(())
}
