//! Catalog Index
//!
//! Flattens every product document into one searchable card list with one
//! entry per rarity variant, gathers filter options and writes the result
//! under a content-hashed file name next to a small manifest.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, warn};

pub const INDEX_FILE_PREFIX: &str = "all_cards_db.";
pub const MANIFEST_FILE_NAME: &str = "card-db-manifest.json";

/// One `{productId}.json` document as written by the crawler
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDocument {
    pub product_id: String,
    pub cards: Map<String, Value>,
}

/// One rarity variant of one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedCard {
    /// `{baseId}{rarity}`
    pub id: String,
    pub base_id: String,
    pub product_id: String,
    pub rarity: String,
    pub link: Vec<String>,
    /// Remaining persisted fields, unchanged
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub product_names: Vec<String>,
    pub traits: Vec<String>,
    pub rarities: Vec<String>,
    pub cost_range: NumericRange,
    pub power_range: NumericRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogIndex {
    pub timestamp: String,
    pub filter_options: FilterOptions,
    pub cards: Vec<IndexedCard>,
    pub version: String,
}

impl CatalogIndex {
    /// Hex digest prefix carried in the version and the file name
    pub fn hash(&self) -> &str {
        self.version.trim_start_matches('v')
    }

    pub fn file_name(&self) -> String {
        format!("{INDEX_FILE_PREFIX}{}.json", self.hash())
    }
}

/// Hashed view of the index; `version` is derived from it
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexContent<'a> {
    timestamp: &'a str,
    filter_options: &'a FilterOptions,
    cards: &'a [IndexedCard],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub product_count: usize,
    pub trait_count: usize,
    pub rarity_count: usize,
    pub cost_range: NumericRange,
    pub power_range: NumericRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    pub version: String,
    pub hash: String,
    pub timestamp: String,
    pub file_name: String,
    pub file_size: String,
    pub card_count: usize,
    pub filter_options: FilterSummary,
}

/// Min/max accumulator for numeric fields; stays 0/0 when nothing is numeric
#[derive(Debug, Default)]
struct RangeTracker(Option<(u64, u64)>);

impl RangeTracker {
    fn observe(&mut self, value: Option<&Value>) {
        let Some(n) = value.and_then(Value::as_u64) else {
            return;
        };
        self.0 = Some(match self.0 {
            Some((min, max)) => (min.min(n), max.max(n)),
            None => (n, n),
        });
    }

    fn range(&self) -> NumericRange {
        self.0.map_or_else(NumericRange::default, |(min, max)| NumericRange { min, max })
    }
}

/// Push `value` unless already present, keeping first-seen order
fn push_distinct(list: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
    if seen.insert(value.to_string()) {
        list.push(value.to_string());
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogIndexBuilder;

impl CatalogIndexBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Read every `*.json` document in `data_dir`, ordered by product id
    pub async fn load_documents(&self, data_dir: &Path) -> Result<Vec<ProductDocument>> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(data_dir)
            .await
            .with_context(|| format!("Failed to read card data directory {:?}", data_dir))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_index_output = name.starts_with(INDEX_FILE_PREFIX) || name == MANIFEST_FILE_NAME;
            if path.extension().is_some_and(|ext| ext == "json") && !is_index_output {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_stem().cmp(&b.file_stem()));

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {:?}", path))?;
            let cards: Map<String, Value> =
                serde_json::from_str(&content).with_context(|| format!("Invalid product document {:?}", path))?;
            let product_id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            documents.push(ProductDocument { product_id, cards });
        }

        info!("Loaded {} product documents from {:?}", documents.len(), data_dir);
        Ok(documents)
    }

    pub fn build(&self, documents: &[ProductDocument], timestamp: DateTime<Utc>) -> Result<CatalogIndex> {
        let mut cards = Vec::new();
        let mut product_names = (Vec::new(), HashSet::new());
        let mut traits = (Vec::new(), HashSet::new());
        let mut rarities = BTreeSet::new();
        let mut cost = RangeTracker::default();
        let mut power = RangeTracker::default();

        for document in documents {
            for (base_id, value) in &document.cards {
                let Some(record) = value.as_object() else {
                    warn!("Skipping malformed entry {} in {}", base_id, document.product_id);
                    continue;
                };

                if let Some(name) = record.get("product_name").and_then(Value::as_str) {
                    if !name.is_empty() {
                        push_distinct(&mut product_names.0, &mut product_names.1, name);
                    }
                }
                if let Some(Value::Array(list)) = record.get("trait") {
                    for t in list.iter().filter_map(Value::as_str) {
                        push_distinct(&mut traits.0, &mut traits.1, t);
                    }
                }
                cost.observe(record.get("cost"));
                power.observe(record.get("power"));

                let link = string_list(record.get("link"));
                let mut fields = record.clone();
                fields.remove("rarity");
                fields.remove("link");

                for rarity in string_list(record.get("rarity")) {
                    rarities.insert(rarity.clone());
                    cards.push(IndexedCard {
                        id: format!("{base_id}{rarity}"),
                        base_id: base_id.clone(),
                        product_id: document.product_id.clone(),
                        rarity,
                        link: link.clone(),
                        fields: fields.clone(),
                    });
                }
            }
        }

        expand_links(&mut cards);

        let filter_options = FilterOptions {
            product_names: product_names.0,
            traits: traits.0,
            rarities: rarities.into_iter().collect(),
            cost_range: cost.range(),
            power_range: power.range(),
        };
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        let content = serde_json::to_vec(&IndexContent {
            timestamp: &timestamp,
            filter_options: &filter_options,
            cards: &cards,
        })
        .context("Failed to serialize card index")?;
        let digest = blake3::hash(&content).to_hex();
        let version = format!("v{}", &digest.as_str()[..8]);

        info!("Indexed {} cards, version {}", cards.len(), version);
        Ok(CatalogIndex {
            timestamp,
            filter_options,
            cards,
            version,
        })
    }

    /// Write the index and its manifest; older index files are removed
    pub async fn write(&self, index: &CatalogIndex, out_dir: &Path) -> Result<IndexManifest> {
        fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

        let file_name = index.file_name();
        let index_path = out_dir.join(&file_name);
        let content = serde_json::to_vec(index).context("Failed to serialize card index")?;
        fs::write(&index_path, &content)
            .await
            .with_context(|| format!("Failed to write {:?}", index_path))?;

        #[allow(clippy::cast_precision_loss)]
        let size_mb = content.len() as f64 / 1024.0 / 1024.0;
        let manifest = IndexManifest {
            version: index.version.clone(),
            hash: index.hash().to_string(),
            timestamp: index.timestamp.clone(),
            file_name: file_name.clone(),
            file_size: format!("{size_mb:.2} MB"),
            card_count: index.cards.len(),
            filter_options: FilterSummary {
                product_count: index.filter_options.product_names.len(),
                trait_count: index.filter_options.traits.len(),
                rarity_count: index.filter_options.rarities.len(),
                cost_range: index.filter_options.cost_range,
                power_range: index.filter_options.power_range,
            },
        };
        let manifest_path = out_dir.join(MANIFEST_FILE_NAME);
        let manifest_json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json)
            .await
            .with_context(|| format!("Failed to write {:?}", manifest_path))?;
        info!("Wrote {:?} ({})", index_path, manifest.file_size);

        for stale in stale_index_files(out_dir, &file_name).await? {
            fs::remove_file(&stale)
                .await
                .with_context(|| format!("Failed to remove old index {:?}", stale))?;
            info!("Removed old index {:?}", stale);
        }

        Ok(manifest)
    }
}

/// Replace base-id links with the ids of every variant of the linked cards
fn expand_links(cards: &mut [IndexedCard]) {
    let mut variants: HashMap<String, Vec<String>> = HashMap::new();
    for card in cards.iter() {
        let ids = variants.entry(card.base_id.clone()).or_default();
        if !ids.contains(&card.id) {
            ids.push(card.id.clone());
        }
    }

    for card in cards.iter_mut() {
        card.link = card
            .link
            .iter()
            .filter_map(|base_id| variants.get(base_id))
            .flatten()
            .cloned()
            .collect();
    }
}

async fn stale_index_files(out_dir: &Path, current: &str) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    let mut entries = fs::read_dir(out_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(INDEX_FILE_PREFIX) && name.ends_with(".json") && name != current {
            stale.push(entry.path());
        }
    }
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn document(product_id: &str, cards: Value) -> ProductDocument {
        ProductDocument {
            product_id: product_id.to_string(),
            cards: cards.as_object().cloned().unwrap(),
        }
    }

    fn sample() -> Vec<ProductDocument> {
        vec![
            document(
                "dal-w79",
                json!({
                    "DAL/W79-001": {
                        "name": "十香", "product_name": "ブースターパック", "type": "character",
                        "level": 3, "power": 10000, "cost": 2, "rarity": ["RR", "SP"],
                        "trait": ["精霊", "武器"], "color": "red", "soul": 2,
                        "link": ["DAL/W79-P01"], "effect": "-"
                    },
                    "DAL/W79-002": {
                        "name": "四糸乃", "product_name": "ブースターパック", "type": "climax",
                        "level": "-", "power": "-", "cost": "-", "rarity": ["CR"],
                        "trait": "-", "color": "blue", "soul": "-", "link": [], "effect": "-"
                    }
                }),
            ),
            document(
                "dal-w79-pr",
                json!({
                    "DAL/W79-P01": {
                        "name": "精霊", "product_name": "PRカード", "type": "event",
                        "level": 0, "power": "-", "cost": 0, "rarity": ["PR"],
                        "trait": ["精霊"], "color": "yellow", "soul": "-",
                        "link": ["DAL/W79-001"], "effect": "「十香」"
                    }
                }),
            ),
        ]
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_build_flattens_variants() {
        let index = CatalogIndexBuilder::new().build(&sample(), fixed_time()).unwrap();

        let ids: Vec<&str> = index.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["DAL/W79-001RR", "DAL/W79-001SP", "DAL/W79-002CR", "DAL/W79-P01PR"]);
        assert_eq!(index.cards[1].base_id, "DAL/W79-001");
        assert_eq!(index.cards[1].product_id, "dal-w79");
        assert_eq!(index.cards[1].rarity, "SP");
        assert_eq!(index.cards[1].fields["name"], "十香");
        assert!(!index.cards[1].fields.contains_key("rarity"));
    }

    #[test]
    fn test_links_expand_to_every_variant() {
        let index = CatalogIndexBuilder::new().build(&sample(), fixed_time()).unwrap();

        assert_eq!(index.cards[0].link, ["DAL/W79-P01PR"]);
        assert_eq!(index.cards[3].link, ["DAL/W79-001RR", "DAL/W79-001SP"]);
        assert!(index.cards[2].link.is_empty());
    }

    #[test]
    fn test_filter_options() {
        let index = CatalogIndexBuilder::new().build(&sample(), fixed_time()).unwrap();
        let options = &index.filter_options;

        assert_eq!(options.product_names, ["ブースターパック", "PRカード"]);
        assert_eq!(options.traits, ["精霊", "武器"]);
        assert_eq!(options.rarities, ["CR", "PR", "RR", "SP"]);
        assert_eq!(options.cost_range, NumericRange { min: 0, max: 2 });
        assert_eq!(options.power_range, NumericRange { min: 10000, max: 10000 });
    }

    #[test]
    fn test_version_is_stable_for_same_input() {
        let builder = CatalogIndexBuilder::new();
        let first = builder.build(&sample(), fixed_time()).unwrap();
        let second = builder.build(&sample(), fixed_time()).unwrap();

        assert_eq!(first.version, second.version);
        assert_eq!(first.version.len(), 9);
        assert!(first.version.starts_with('v'));
        assert_eq!(first.timestamp, "2026-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_empty_catalog_has_zero_ranges() {
        let index = CatalogIndexBuilder::new().build(&[], fixed_time()).unwrap();
        assert!(index.cards.is_empty());
        assert_eq!(index.filter_options.cost_range, NumericRange::default());
    }

    #[tokio::test]
    async fn test_write_replaces_old_index_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("all_cards_db.deadbeef.json"), "{}").unwrap();
        std::fs::write(dir.path().join("keep.json"), "{}").unwrap();

        let builder = CatalogIndexBuilder::new();
        let index = builder.build(&sample(), fixed_time()).unwrap();
        let manifest = builder.write(&index, dir.path()).await.unwrap();

        assert_eq!(manifest.card_count, 4);
        assert_eq!(manifest.file_name, index.file_name());
        assert!(dir.path().join(&manifest.file_name).exists());
        assert!(!dir.path().join("all_cards_db.deadbeef.json").exists());
        assert!(dir.path().join("keep.json").exists());

        let written: CatalogIndex =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(&manifest.file_name)).unwrap()).unwrap();
        assert_eq!(written, index);

        let manifest_json: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(MANIFEST_FILE_NAME)).unwrap()).unwrap();
        assert_eq!(manifest_json["filterOptions"]["rarityCount"], 4);
    }

    #[tokio::test]
    async fn test_load_documents_reads_json_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        for doc in sample().iter().rev() {
            let path = dir.path().join(format!("{}.json", doc.product_id));
            std::fs::write(path, serde_json::to_string(&doc.cards).unwrap()).unwrap();
        }
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let documents = CatalogIndexBuilder::new().load_documents(dir.path()).await.unwrap();

        assert_eq!(documents, sample());
    }
}
