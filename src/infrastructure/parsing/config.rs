//! Parsing configuration for card list extraction
//!
//! Centralized configuration for CSS selectors, localized field labels and
//! the lookup tables used to normalize raw values. Nothing catalog-specific
//! is hardcoded in the parsers themselves.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Color};

/// Main parsing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Base URL for resolving relative image and pager links; the CLI copies
    /// `catalog.base_url` here before building parsers
    pub base_url: String,

    /// Card list selectors
    pub card_list_selectors: CardListSelectors,

    /// Localized labels that prefix each field-bearing unit
    pub field_labels: FieldLabels,

    /// Lookup tables for the field normalizer
    pub normalizer: NormalizerTables,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        use crate::infrastructure::config::ws_tcg;
        Self {
            base_url: ws_tcg::BASE_URL.to_string(),
            card_list_selectors: CardListSelectors::default(),
            field_labels: FieldLabels::default(),
            normalizer: NormalizerTables::default(),
        }
    }
}

/// CSS selectors for card list pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardListSelectors {
    /// One card row on a result page
    pub row: String,

    /// Title block inside a row
    pub title: String,

    /// Highlighted spans: name and card number in the title, effect in a cell
    pub highlight: String,

    /// First link inside the title block; the product name follows it
    pub title_link: String,

    /// Card artwork
    pub image: String,

    /// Field-bearing inline units
    pub unit: String,

    /// Icon inside a unit (color)
    pub unit_icon: String,

    /// Effect text span
    pub effect: String,

    /// Link to the next result page
    pub next_page: String,

    /// Banner holding the number of matching cards
    pub result_count: String,
}

impl Default for CardListSelectors {
    fn default() -> Self {
        Self {
            row: ".search-result-table tbody tr".to_string(),
            title: "h4".to_string(),
            highlight: "span.highlight_target".to_string(),
            title_link: "a".to_string(),
            image: "th a img".to_string(),
            unit: "td span.unit".to_string(),
            unit_icon: "img".to_string(),
            effect: "td > span.highlight_target".to_string(),
            next_page: ".pager span.next a".to_string(),
            result_count: "#searchResults .center".to_string(),
        }
    }
}

/// Localized label prefixes of the field-bearing units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLabels {
    pub category: String,
    pub level: String,
    pub power: String,
    pub cost: String,
    pub rarity: String,
    #[serde(rename = "trait")]
    pub traits: String,
    pub color: String,
    pub soul: String,

    /// Icon file counted once per soul point
    pub soul_icon: String,

    /// Text that marks the result count banner ("N件該当しました")
    pub result_count_marker: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            category: "種類：".to_string(),
            level: "レベル：".to_string(),
            power: "パワー：".to_string(),
            cost: "コスト：".to_string(),
            rarity: "レアリティ：".to_string(),
            traits: "特徴：".to_string(),
            color: "色：".to_string(),
            soul: "ソウル：".to_string(),
            soul_icon: "soul.gif".to_string(),
            result_count_marker: "件該当しました".to_string(),
        }
    }
}

/// Rewrites one raw rarity into a distinct label for a specific print pattern
///
/// Applies only when the raw card number ends with `code_suffix` and the raw
/// rarity equals `raw_rarity` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityRule {
    pub code_suffix: String,
    pub raw_rarity: String,
    pub label: String,
}

/// Lookup tables for the field normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerTables {
    /// Localized type token -> category
    pub categories: HashMap<String, Category>,

    /// Color icon file name -> color
    pub colors: HashMap<String, Color>,

    /// Raw trait values meaning "no traits"
    pub trait_placeholders: Vec<String>,

    /// Separator between traits in the raw trait text
    pub trait_delimiter: String,

    /// Special-case rarity rewrites, checked in order
    pub rarity_rules: Vec<RarityRule>,
}

impl Default for NormalizerTables {
    fn default() -> Self {
        let categories = [
            ("キャラ", Category::Character),
            ("クライマックス", Category::Climax),
            ("イベント", Category::Event),
        ]
        .into_iter()
        .map(|(token, category)| (token.to_string(), category))
        .collect();

        let colors = [
            ("yellow.gif", Color::Yellow),
            ("red.gif", Color::Red),
            ("green.gif", Color::Green),
            ("blue.gif", Color::Blue),
        ]
        .into_iter()
        .map(|(icon, color)| (icon.to_string(), color))
        .collect();

        Self {
            categories,
            colors,
            trait_placeholders: vec!["-".to_string(), "－".to_string()],
            trait_delimiter: "・".to_string(),
            rarity_rules: vec![RarityRule {
                code_suffix: "S".to_string(),
                raw_rarity: "PR".to_string(),
                label: "PR-S".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_survives_json_round_trip() {
        let config = ParsingConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ParsingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(json.contains("\"キャラ\":\"character\""));
    }
}
