//! Infrastructure layer for configuration, parsing and external integrations
//!
//! This module provides HTML parsing, the HTTP client, catalog sources, image
//! storage, product document output, configuration and logging.

pub mod catalog_sources; // Live and snapshot card list pages
pub mod config; // Configuration constants and helpers
pub mod http_client;
pub mod image_store;
pub mod json_writer;
pub mod logging; // Logging infrastructure
pub mod parsing; // Card list and card row parsers
pub mod parsing_error; // Parsing error types

// Re-export commonly used items
pub use catalog_sources::{HttpCatalogSource, SnapshotCatalogSource};
pub use config::{AppConfig, ConfigManager, ws_tcg};
pub use http_client::{HttpClient, HttpClientConfig};
pub use image_store::HttpImageStore;
pub use json_writer::ProductJsonWriter;
pub use logging::init_logging_with_config;
pub use parsing::{CardListParser, CardRowParser, FieldNormalizer, ParsingConfig, ParsingError, ParsingResult};
