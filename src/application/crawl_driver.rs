//! Crawl Driver
//!
//! Walks the catalog source page by page, extracts each row, aggregates the
//! record and stores its artwork. Row and image failures are local: they are
//! logged and counted, and the crawl moves on. Only a failing catalog source
//! ends the crawl early, and [`run_crawl`] still links and writes whatever
//! was gathered up to that point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::aggregator::ProductAggregator;
use super::context::{CrawlContext, CrawlStats};
use super::linker::CrossLinker;
use crate::domain::{CatalogSource, ImageStore};
use crate::infrastructure::json_writer::ProductJsonWriter;
use crate::infrastructure::parsing::CardRowParser;

pub struct CrawlDriver<S, I> {
    source: S,
    images: I,
    parser: CardRowParser,
    aggregator: ProductAggregator,
}

impl<S, I> CrawlDriver<S, I>
where
    S: CatalogSource,
    I: ImageStore,
{
    pub fn new(source: S, images: I, parser: CardRowParser, aggregator: ProductAggregator) -> Self {
        Self {
            source,
            images,
            parser,
            aggregator,
        }
    }

    /// Visit every page; an error means the catalog source failed mid-crawl
    pub async fn run(&mut self, ctx: &mut CrawlContext) -> Result<()> {
        loop {
            let page = ctx.stats.pages_visited + 1;
            let rows = self
                .source
                .current_rows()
                .await
                .with_context(|| format!("Failed to read rows of page {page}"))?;
            ctx.stats.pages_visited = page;
            info!("Page {}: {} rows", page, rows.len());

            for row in &rows {
                self.process_row(ctx, row).await;
            }

            let has_next = self
                .source
                .advance()
                .await
                .with_context(|| format!("Failed to advance past page {page}"))?;
            if !has_next {
                break;
            }
        }

        Ok(())
    }

    async fn process_row(&self, ctx: &mut CrawlContext, row: &str) {
        ctx.stats.rows_seen += 1;

        let record = match self.parser.parse_fragment(row) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping row {}: {}", ctx.stats.rows_seen, e);
                ctx.stats.rows_skipped += 1;
                return;
            }
        };
        debug!("Extracted {} ({})", record.identity_key, record.latest_rarity());

        let image_url = record.image_url.clone();
        let image_name = record.image_file_name();
        let outcome = self.aggregator.aggregate(ctx, record);

        let Some(image_dir) = ctx
            .product(&outcome.product_id)
            .map(|grouping| grouping.image_dir().to_path_buf())
        else {
            return;
        };

        if outcome.product_created {
            info!("New product {} (images in {:?})", outcome.product_id, image_dir);
            if let Err(e) = self.images.prepare_directory(&image_dir).await {
                warn!("Failed to prepare image directory {:?}: {:#}", image_dir, e);
            }
        }

        let Some(url) = image_url else {
            return;
        };
        let destination = image_dir.join(image_name);
        match self.images.save(&url, &destination).await {
            Ok(()) => ctx.stats.images_saved += 1,
            Err(e) => {
                warn!("Failed to save image {} to {:?}: {:#}", url, destination, e);
                ctx.stats.images_failed += 1;
            }
        }
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub stats: CrawlStats,
    pub product_count: usize,
    pub record_count: usize,
    pub link_count: usize,
    pub written: Vec<PathBuf>,
    /// Set when the crawl ended early; the written documents hold the partial result
    pub crawl_error: Option<String>,
}

/// Crawl, cross-link and write every product document
pub async fn run_crawl<S, I>(
    driver: &mut CrawlDriver<S, I>,
    ctx: &mut CrawlContext,
    writer: &ProductJsonWriter,
) -> Result<CrawlReport>
where
    S: CatalogSource,
    I: ImageStore,
{
    let crawl_error = match driver.run(ctx).await {
        Ok(()) => None,
        Err(e) => {
            error!("Crawl stopped early, writing partial results: {:#}", e);
            Some(format!("{e:#}"))
        }
    };

    let link_count = CrossLinker::new().link(ctx);
    let written = writer.write_all(ctx.products()).await?;

    Ok(CrawlReport {
        stats: ctx.stats,
        product_count: ctx.product_count(),
        record_count: ctx.record_count(),
        link_count,
        written,
        crawl_error,
    })
}
