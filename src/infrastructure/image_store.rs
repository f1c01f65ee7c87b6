//! Card artwork persistence over HTTP and the local file system

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::ImageStore;
use crate::infrastructure::http_client::HttpClient;

pub struct HttpImageStore {
    client: Arc<HttpClient>,
}

impl HttpImageStore {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

/// Remove `dir` if present, then recreate it empty
pub async fn reset_directory(dir: &Path) -> Result<()> {
    if fs::try_exists(dir).await.unwrap_or(false) {
        fs::remove_dir_all(dir)
            .await
            .with_context(|| format!("Failed to clear image directory {:?}", dir))?;
    }
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create image directory {:?}", dir))?;
    Ok(())
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn prepare_directory(&self, dir: &Path) -> Result<()> {
        reset_directory(dir).await
    }

    async fn save(&self, url: &str, destination: &Path) -> Result<()> {
        let bytes = self.client.get_bytes(url).await?;
        fs::write(destination, &bytes)
            .await
            .with_context(|| format!("Failed to write image {:?}", destination))?;
        debug!("Saved {} ({} bytes)", destination.display(), bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reset_directory_clears_previous_contents() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("dal-w79");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.png"), b"old").unwrap();

        reset_directory(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reset_directory_creates_missing_parents() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("images").join("xyz-001-pr");

        reset_directory(&dir).await.unwrap();

        assert!(dir.is_dir());
    }
}
