//! Product document writer
//!
//! One `{productId}.json` per grouping: a map of identity key to persisted
//! record in encounter order, two-space indented, non-ASCII kept literal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::domain::ProductGrouping;

pub struct ProductJsonWriter {
    output_dir: PathBuf,
}

impl ProductJsonWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one product document, replacing any previous one
    pub async fn write_product(&self, grouping: &ProductGrouping) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", self.output_dir))?;

        let path = self.output_dir.join(grouping.id().json_file_name());
        let content = serde_json::to_string_pretty(grouping)
            .with_context(|| format!("Failed to serialize product {}", grouping.id()))?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;

        info!("Wrote {} records to {:?}", grouping.len(), path);
        Ok(path)
    }

    /// Write every grouping; stops at the first failure
    pub async fn write_all<'a>(
        &self,
        groupings: impl IntoIterator<Item = &'a ProductGrouping>,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for grouping in groupings {
            written.push(self.write_product(grouping).await?);
        }
        Ok(written)
    }
}
