//! Configuration infrastructure
//!
//! Contains configuration loading and management for card list crawling.
//!
//! Configuration is organized into sections:
//! 1. Output paths (JSON documents, card images, logs)
//! 2. Catalog access (site URLs, query parameter names, politeness)
//! 3. Parsing (selectors, localized labels, normalizer tables)
//! 4. Product grouping rules
//! 5. Logging

#![allow(clippy::uninlined_format_args)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::application::grouping::GroupingRules;
use crate::infrastructure::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where crawl output lands
    pub paths: PathsConfig,

    /// How the card list is reached
    pub catalog: CatalogConfig,

    /// Selectors, labels and lookup tables
    pub parsing: ParsingConfig,

    /// Product id derivation rules
    pub grouping: GroupingRules,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Point the parsers at `catalog.base_url` so image and pager links resolve
    /// against the host that served the page
    pub fn sync_base_url(&mut self) {
        self.parsing.base_url.clone_from(&self.catalog.base_url);
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory receiving one `{productId}.json` per product
    pub json_output_dir: PathBuf,

    /// Parent directory of the per-product image directories
    pub image_root_dir: PathBuf,

    /// Directory for log files
    pub log_dir: PathBuf,
}

/// Catalog site access settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Site root used to resolve relative links
    pub base_url: String,

    /// Card list landing page
    pub cardlist_url: String,

    /// Search endpoint, relative to `base_url`
    pub search_path: String,

    /// Query parameter carrying the series name
    pub series_param: String,

    /// Query parameter carrying the product name
    pub product_param: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Delay between result page requests in milliseconds
    pub request_delay_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Rename an existing log file with its timestamp instead of appending to it
    pub rotate_existing: bool,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            json_output_dir: PathBuf::from(defaults::JSON_OUTPUT_DIR),
            image_root_dir: PathBuf::from(defaults::IMAGE_ROOT_DIR),
            log_dir: PathBuf::from(defaults::LOG_DIR),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: ws_tcg::BASE_URL.to_string(),
            cardlist_url: ws_tcg::CARDLIST_URL.to_string(),
            search_path: ws_tcg::SEARCH_PATH.to_string(),
            series_param: ws_tcg::params::SERIES.to_string(),
            product_param: ws_tcg::params::PRODUCT.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let module_filters = [
            ("reqwest", "warn"),
            ("hyper", "warn"),
            ("html5ever", "warn"),
            ("selectors", "warn"),
        ]
        .into_iter()
        .map(|(module, level)| (module.to_string(), level.to_string()))
        .collect();

        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            rotate_existing: defaults::LOG_ROTATE_EXISTING,
            module_filters,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Create a configuration manager pointing at the per-user config file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file could not be parsed: {}", parse_error);
                warn!("Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Weiss Schwarz card list site constants
pub mod ws_tcg {
    /// Site root
    pub const BASE_URL: &str = "https://ws-tcg.com/";

    /// Card list landing page
    pub const CARDLIST_URL: &str = "https://ws-tcg.com/cardlist/";

    /// Search endpoint relative to the site root
    pub const SEARCH_PATH: &str = "cardlist/search";

    /// Query parameter names of the search endpoint
    pub mod params {
        pub const SERIES: &str = "title";
        pub const PRODUCT: &str = "expansion";
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config directory
    pub const APP_DIR_NAME: &str = "ws-cardlist";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "ws_cardlist_config.json";

    /// Default product document directory
    pub const JSON_OUTPUT_DIR: &str = "cards";

    /// Default image root directory
    pub const IMAGE_ROOT_DIR: &str = "images";

    /// Default log directory
    pub const LOG_DIR: &str = "logs";

    /// Default user agent
    pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; ws-cardlist/0.3)";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default delay between result pages in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 1000;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;
    pub const LOG_FILE_NAME: &str = "ws-cardlist.log";
    pub const LOG_ROTATE_EXISTING: bool = true;
}
