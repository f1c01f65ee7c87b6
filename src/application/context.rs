//! Crawl accumulation state
//!
//! Everything the crawl gathers lives here and is passed explicitly from the
//! driver to the aggregator and the cross-linker.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{ProductGrouping, ProductId};

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_visited: u32,
    pub rows_seen: u32,
    pub rows_skipped: u32,
    pub records_merged: u32,
    pub images_saved: u32,
    pub images_failed: u32,
}

#[derive(Debug, Clone)]
pub struct CrawlContext {
    products: BTreeMap<ProductId, ProductGrouping>,
    image_root: PathBuf,
    pub stats: CrawlStats,
}

impl CrawlContext {
    pub fn new(image_root: impl Into<PathBuf>) -> Self {
        Self {
            products: BTreeMap::new(),
            image_root: image_root.into(),
            stats: CrawlStats::default(),
        }
    }

    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    /// Image directory for a product: `{image_root}/{productId}`
    pub fn image_dir_for(&self, id: &ProductId) -> PathBuf {
        self.image_root.join(id.as_str())
    }

    pub fn product(&self, id: &ProductId) -> Option<&ProductGrouping> {
        self.products.get(id)
    }

    /// Groupings ordered by product id
    pub fn products(&self) -> impl Iterator<Item = &ProductGrouping> {
        self.products.values()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn record_count(&self) -> usize {
        self.products.values().map(ProductGrouping::len).sum()
    }

    pub(crate) fn products_mut(&mut self) -> impl Iterator<Item = &mut ProductGrouping> {
        self.products.values_mut()
    }

    /// Grouping for `id`, created on first sight; the flag is `true` when it is new
    pub(crate) fn ensure_product(&mut self, id: &ProductId) -> (&mut ProductGrouping, bool) {
        let image_dir = self.image_dir_for(id);
        match self.products.entry(id.clone()) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(ProductGrouping::new(id.clone(), image_dir)), true),
        }
    }
}
