//! Card list page parser
//!
//! Splits a search result page into row fragments and reads the pager and
//! the result count banner. Row contents are left to [`CardRowParser`].
//!
//! [`CardRowParser`]: super::CardRowParser

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::card_row_parser::compile_selector;
use super::config::{CardListSelectors, FieldLabels};
use super::{ContextualParser, ParseContext, ParsingError, ParsingResult};

static COUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid count pattern"));

/// One parsed result page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    /// Outer HTML of every card row, in page order
    pub rows: Vec<String>,

    /// Absolute URL of the next result page, if the pager offers one
    pub next_page_url: Option<String>,

    /// Number of matching cards announced by the result banner
    pub result_count: Option<u32>,
}

/// Parser for search result pages
pub struct CardListParser {
    row: Selector,
    next_page: Selector,
    result_count: Selector,
    result_count_marker: String,
}

impl CardListParser {
    pub fn new() -> Result<Self> {
        Self::with_config(&CardListSelectors::default(), &FieldLabels::default())
    }

    pub fn with_config(selectors: &CardListSelectors, labels: &FieldLabels) -> Result<Self> {
        Ok(Self {
            row: compile_selector(&selectors.row)?,
            next_page: compile_selector(&selectors.next_page)?,
            result_count: compile_selector(&selectors.result_count)?,
            result_count_marker: labels.result_count_marker.clone(),
        })
    }

    /// Read the announced result count; `None` when the banner is missing
    pub fn result_count(&self, html: &Html) -> Option<u32> {
        let banner = html
            .select(&self.result_count)
            .map(|e| e.text().collect::<String>())
            .find(|text| text.contains(self.result_count_marker.as_str()))?;
        COUNT_PATTERN
            .captures(&banner)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Resolve the pager's next link against the base URL
    pub fn next_page_url(&self, html: &Html, base_url: &str) -> ParsingResult<Option<String>> {
        let Some(href) = html
            .select(&self.next_page)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            return Ok(None);
        };

        let base = Url::parse(base_url)
            .map_err(|e| ParsingError::url_resolution_failed(base_url, &format!("Invalid base URL: {e}"), None))?;
        base.join(href)
            .map(|url| Some(url.to_string()))
            .map_err(|e| ParsingError::url_resolution_failed(href, &e.to_string(), Some(base_url)))
    }
}

impl ContextualParser for CardListParser {
    type Output = CatalogPage;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let rows: Vec<String> = html.select(&self.row).map(|row: ElementRef| row.html()).collect();
        let next_page_url = self.next_page_url(html, &context.base_url)?;
        let result_count = self.result_count(html);

        debug!(
            "Page {}: {} rows, next page: {}",
            context.page_number,
            rows.len(),
            next_page_url.as_deref().unwrap_or("none")
        );

        Ok(CatalogPage {
            rows,
            next_page_url,
            result_count,
        })
    }
}
