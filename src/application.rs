//! Application layer module
//!
//! Crawl orchestration over the domain types: product grouping, aggregation,
//! cross-linking, the crawl driver and the catalog index build.

pub mod aggregator;
pub mod catalog_index;
pub mod context;
pub mod crawl_driver;
pub mod grouping;
pub mod linker;

pub use aggregator::{MergeOutcome, ProductAggregator, RecordOutcome};
pub use catalog_index::{CatalogIndex, CatalogIndexBuilder, FilterOptions, IndexManifest, IndexedCard, NumericRange};
pub use context::{CrawlContext, CrawlStats};
pub use crawl_driver::{CrawlDriver, CrawlReport, run_crawl};
pub use grouping::{GroupingResolver, GroupingRules};
pub use linker::CrossLinker;
