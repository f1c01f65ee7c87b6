//! Catalog sources
//!
//! [`HttpCatalogSource`] walks the live search results page by page;
//! [`SnapshotCatalogSource`] replays saved result pages from a directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::domain::{CatalogFilter, CatalogSource};
use crate::infrastructure::config::CatalogConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::{CardListParser, CatalogPage, ContextualParser, ParseContext, ParsingConfig};

/// Parse one result page; zero announced results means no rows
fn parse_page(parser: &CardListParser, body: &str, context: &ParseContext) -> Result<CatalogPage> {
    // Html is not Send, keep it inside this synchronous scope
    let html = Html::parse_document(body);
    let page = parser
        .parse_with_context(&html, context)
        .with_context(|| format!("Failed to parse result page {}", context.page_number))?;

    if page.result_count == Some(0) {
        return Ok(CatalogPage {
            result_count: Some(0),
            ..CatalogPage::default()
        });
    }
    Ok(page)
}

/// Build the filtered search URL for one series/product pair
pub fn search_url(catalog: &CatalogConfig, filter: &CatalogFilter) -> Result<Url> {
    let base = Url::parse(&catalog.base_url).with_context(|| format!("Invalid base URL: {}", catalog.base_url))?;
    let mut url = base
        .join(&catalog.search_path)
        .with_context(|| format!("Invalid search path: {}", catalog.search_path))?;
    url.query_pairs_mut()
        .append_pair(&catalog.series_param, &filter.series)
        .append_pair(&catalog.product_param, &filter.product);
    Ok(url)
}

/// Live card list, one HTTP request per result page
pub struct HttpCatalogSource {
    client: Arc<HttpClient>,
    parser: CardListParser,
    base_url: String,
    delay: Duration,
    page_number: u32,
    current: CatalogPage,
}

impl HttpCatalogSource {
    /// Submit the filtered search and load the first result page
    pub async fn open(
        client: Arc<HttpClient>,
        catalog: &CatalogConfig,
        parsing: &ParsingConfig,
        filter: &CatalogFilter,
    ) -> Result<Self> {
        let parser = CardListParser::with_config(&parsing.card_list_selectors, &parsing.field_labels)?;
        let url = search_url(catalog, filter)?;

        let mut source = Self {
            client,
            parser,
            base_url: catalog.base_url.clone(),
            delay: Duration::from_millis(catalog.request_delay_ms),
            page_number: 1,
            current: CatalogPage::default(),
        };
        source.current = source.fetch_page(url.as_str()).await?;

        match source.current.result_count {
            Some(count) => info!("Search for {} / {} matched {} cards", filter.series, filter.product, count),
            None => info!("Search for {} / {} returned no result count", filter.series, filter.product),
        }

        Ok(source)
    }

    async fn fetch_page(&self, url: &str) -> Result<CatalogPage> {
        let body = self.client.get_text(url).await?;
        let context = ParseContext::new(self.page_number, self.base_url.as_str());
        parse_page(&self.parser, &body, &context)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn current_rows(&mut self) -> Result<Vec<String>> {
        Ok(self.current.rows.clone())
    }

    async fn advance(&mut self) -> Result<bool> {
        let Some(next_url) = self.current.next_page_url.take() else {
            return Ok(false);
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.page_number += 1;
        debug!("Following pager to page {}: {}", self.page_number, next_url);
        self.current = self.fetch_page(&next_url).await?;
        Ok(true)
    }
}

/// Saved result pages, one `*.html` file per page in file name order
pub struct SnapshotCatalogSource {
    parser: CardListParser,
    base_url: String,
    pages: Vec<PathBuf>,
    position: usize,
    current: CatalogPage,
}

impl SnapshotCatalogSource {
    pub async fn open(dir: impl AsRef<Path>, parsing: &ParsingConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let parser = CardListParser::with_config(&parsing.card_list_selectors, &parsing.field_labels)?;

        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read snapshot directory {:?}", dir))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
                pages.push(path);
            }
        }
        pages.sort();
        info!("Replaying {} snapshot pages from {:?}", pages.len(), dir);

        let mut source = Self {
            parser,
            base_url: parsing.base_url.clone(),
            pages,
            position: 0,
            current: CatalogPage::default(),
        };
        source.load_current().await?;
        Ok(source)
    }

    async fn load_current(&mut self) -> Result<()> {
        let Some(path) = self.pages.get(self.position) else {
            self.current = CatalogPage::default();
            return Ok(());
        };

        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot page {:?}", path))?;
        let page_number = u32::try_from(self.position + 1).unwrap_or(u32::MAX);
        let context = ParseContext::new(page_number, self.base_url.as_str());
        self.current = parse_page(&self.parser, &body, &context)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for SnapshotCatalogSource {
    async fn current_rows(&mut self) -> Result<Vec<String>> {
        Ok(self.current.rows.clone())
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.position + 1 >= self.pages.len() {
            return Ok(false);
        }
        self.position += 1;
        self.load_current().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(rows: &[&str]) -> String {
        let body: String = rows
            .iter()
            .map(|name| format!("<tr><td><h4><span class=\"highlight_target\">{name}</span></h4></td></tr>"))
            .collect();
        format!("<table class=\"search-result-table\"><tbody>{body}</tbody></table>")
    }

    #[test]
    fn test_search_url_carries_filter() {
        let url = search_url(&CatalogConfig::default(), &CatalogFilter::new("デート・ア・ライブ", "ブースターパック")).unwrap();
        assert!(url.as_str().starts_with("https://ws-tcg.com/cardlist/search?"));
        let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert_eq!(
            pairs,
            vec![
                ("title".to_string(), "デート・ア・ライブ".to_string()),
                ("expansion".to_string(), "ブースターパック".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_pages_replay_in_name_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page_02.html"), page(&["C"])).unwrap();
        std::fs::write(dir.path().join("page_01.html"), page(&["A", "B"])).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = SnapshotCatalogSource::open(dir.path(), &ParsingConfig::default())
            .await
            .unwrap();

        let first = source.current_rows().await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(first[0].contains(">A<"));

        assert!(source.advance().await.unwrap());
        let second = source.current_rows().await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(second[0].contains(">C<"));

        assert!(!source.advance().await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_result_banner_yields_no_rows() {
        let dir = TempDir::new().unwrap();
        let html = format!(
            "<div id=\"searchResults\"><p class=\"center\">0件該当しました</p></div>{}",
            page(&["stale"])
        );
        std::fs::write(dir.path().join("page_01.html"), html).unwrap();

        let mut source = SnapshotCatalogSource::open(dir.path(), &ParsingConfig::default())
            .await
            .unwrap();
        assert!(source.current_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_snapshot_directory() {
        let dir = TempDir::new().unwrap();
        let mut source = SnapshotCatalogSource::open(dir.path(), &ParsingConfig::default())
            .await
            .unwrap();
        assert!(source.current_rows().await.unwrap().is_empty());
        assert!(!source.advance().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_snapshot_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = SnapshotCatalogSource::open(dir.path().join("absent"), &ParsingConfig::default()).await;
        assert!(result.is_err());
    }
}
