//! Collaborator interfaces for the crawl
//!
//! The extraction core never talks to the network or the file system
//! directly; the crawl driver reaches both through these traits.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// Catalog filter chosen on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Official series (title) name
    pub series: String,
    /// Official product (expansion) name
    pub product: String,
}

impl CatalogFilter {
    pub fn new(series: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            product: product.into(),
        }
    }
}

/// Paginated source of catalog row markup
#[async_trait]
pub trait CatalogSource: Send {
    /// Row fragments of the page the source is positioned on
    async fn current_rows(&mut self) -> Result<Vec<String>>;

    /// Move to the next page; `false` when the current page was the last one
    async fn advance(&mut self) -> Result<bool>;
}

/// Persistence for card artwork
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Remove anything at `dir` and recreate it empty
    async fn prepare_directory(&self, dir: &Path) -> Result<()>;

    /// Fetch `url` and write the bytes to `destination`
    async fn save(&self, url: &str, destination: &Path) -> Result<()>;
}
