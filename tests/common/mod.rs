//! Shared fixtures for the crawl integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use ws_cardlist_lib::domain::{CatalogSource, ImageStore};

/// One card list row as the live site renders it
pub struct RowSpec<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub rarity: &'a str,
    pub product: &'a str,
    pub effect: Option<&'a str>,
    pub image: Option<&'a str>,
}

impl<'a> RowSpec<'a> {
    pub fn new(code: &'a str, name: &'a str, rarity: &'a str) -> Self {
        Self {
            code,
            name,
            rarity,
            product: "-ブースターパック",
            effect: None,
            image: Some("/images/card.png"),
        }
    }

    pub fn product(mut self, product: &'a str) -> Self {
        self.product = product;
        self
    }

    pub fn effect(mut self, effect: &'a str) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn image(mut self, image: Option<&'a str>) -> Self {
        self.image = image;
        self
    }

    pub fn render(&self) -> String {
        let image = self
            .image
            .map(|src| format!("<th><a href=\"#\"><img src=\"{src}\"></a></th>"))
            .unwrap_or_default();
        let effect = self
            .effect
            .map(|text| format!("<td><span class=\"highlight_target\">{text}</span></td>"))
            .unwrap_or_default();
        format!(
            "<tr>{image}<td><h4><a href=\"#\"><span class=\"highlight_target\">{name}</span>(<span class=\"highlight_target\">{code}</span>)</a> {product}</h4>\
             <span class=\"unit\">種類：キャラ</span><span class=\"unit\">レベル：1</span>\
             <span class=\"unit\">レアリティ：{rarity}</span>\
             <span class=\"unit\">色：<img src=\"/partimages/red.gif\"></span></td>{effect}</tr>",
            name = self.name,
            code = self.code,
            product = self.product,
            rarity = self.rarity,
        )
    }
}

/// Full result page around the given rows, as saved by a snapshot
pub fn result_page(rows: &[String], next_href: Option<&str>) -> String {
    let pager = next_href
        .map(|href| format!("<div class=\"pager\"><span class=\"next\"><a href=\"{href}\">次へ</a></span></div>"))
        .unwrap_or_default();
    format!(
        "<html><body><div id=\"searchResults\"><p class=\"center\">{}件該当しました</p></div>\
         <table class=\"search-result-table\"><tbody>{}</tbody></table>{pager}</body></html>",
        rows.len(),
        rows.concat()
    )
}

/// In-memory pages; optionally fails when asked to move past a given page
pub struct FakeSource {
    pages: VecDeque<Vec<String>>,
    fail_after_page: Option<usize>,
    visited: usize,
}

impl FakeSource {
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages: pages.into(),
            fail_after_page: None,
            visited: 1,
        }
    }

    pub fn failing_after(mut self, page: usize) -> Self {
        self.fail_after_page = Some(page);
        self
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn current_rows(&mut self) -> Result<Vec<String>> {
        Ok(self.pages.front().cloned().unwrap_or_default())
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.fail_after_page == Some(self.visited) {
            bail!("next page link could not be followed");
        }
        if self.pages.len() <= 1 {
            return Ok(false);
        }
        self.pages.pop_front();
        self.visited += 1;
        Ok(true)
    }
}

/// Records every call; URLs containing "broken" fail to save
#[derive(Default)]
pub struct RecordingImageStore {
    pub prepared: Mutex<Vec<PathBuf>>,
    pub saved: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingImageStore {
    pub fn prepared(&self) -> Vec<PathBuf> {
        self.prepared.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<(String, PathBuf)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn prepare_directory(&self, dir: &Path) -> Result<()> {
        self.prepared.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }

    async fn save(&self, url: &str, destination: &Path) -> Result<()> {
        if url.contains("broken") {
            bail!("HTTP request failed with status 404 Not Found: {url}");
        }
        self.saved
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        Ok(())
    }
}

#[async_trait]
impl ImageStore for &RecordingImageStore {
    async fn prepare_directory(&self, dir: &Path) -> Result<()> {
        (**self).prepare_directory(dir).await
    }

    async fn save(&self, url: &str, destination: &Path) -> Result<()> {
        (**self).save(url, destination).await
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
