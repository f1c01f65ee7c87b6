//! Field normalizer
//!
//! Maps raw localized text, icon file names and counts to canonical field
//! values. Never fails: anything unrecognized becomes the unknown marker.

use super::config::NormalizerTables;
use crate::domain::{Category, Color, Field, UNKNOWN_MARKER};

#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    tables: NormalizerTables,
}

impl FieldNormalizer {
    pub fn new(tables: NormalizerTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &NormalizerTables {
        &self.tables
    }

    /// Strip one or more trailing uppercase ASCII letters from a raw card number
    pub fn identity_key(raw_code: &str) -> String {
        raw_code.trim_end_matches(|c: char| c.is_ascii_uppercase()).to_string()
    }

    pub fn category(&self, raw: Option<&str>) -> Category {
        raw.and_then(|token| self.tables.categories.get(token))
            .copied()
            .unwrap_or_default()
    }

    pub fn color(&self, icon_file: Option<&str>) -> Color {
        icon_file
            .and_then(|icon| self.tables.colors.get(icon))
            .copied()
            .unwrap_or_default()
    }

    /// Digits-only text becomes a number; anything else is unknown
    pub fn number(raw: Option<&str>) -> Field<u32> {
        match raw {
            Some(text) if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) => {
                text.parse::<u32>().ok().into()
            }
            _ => Field::Unknown,
        }
    }

    pub fn traits(&self, raw: Option<&str>) -> Field<Vec<String>> {
        let raw = raw.unwrap_or(UNKNOWN_MARKER);
        if self.tables.trait_placeholders.iter().any(|p| p == raw) {
            return Field::Unknown;
        }
        Field::Known(
            raw.split(self.tables.trait_delimiter.as_str())
                .map(|t| t.trim().to_string())
                .collect(),
        )
    }

    /// Zero soul icons means the value is unknown, not zero
    pub fn soul(count: usize) -> Field<u32> {
        match u32::try_from(count) {
            Ok(0) | Err(_) => Field::Unknown,
            Ok(n) => Field::Known(n),
        }
    }

    /// Raw rarity with the special-case rules applied; missing rarity is the unknown marker
    pub fn rarity(&self, raw_code: &str, raw_rarity: Option<&str>) -> String {
        let raw_rarity = raw_rarity.unwrap_or(UNKNOWN_MARKER);
        self.tables
            .rarity_rules
            .iter()
            .find(|rule| raw_code.ends_with(rule.code_suffix.as_str()) && raw_rarity == rule.raw_rarity)
            .map_or_else(|| raw_rarity.to_string(), |rule| rule.label.clone())
    }

    /// Strip leading separators from the raw product name
    pub fn product_name(raw: &str) -> String {
        let cleaned = raw.trim().trim_start_matches('-').trim();
        if cleaned.is_empty() {
            UNKNOWN_MARKER.to_string()
        } else {
            cleaned.to_string()
        }
    }

    /// Effect markup is kept verbatim apart from trimming and newline removal
    pub fn effect(raw: &str) -> Field<String> {
        let text = raw.trim().replace('\n', "");
        if text.is_empty() {
            Field::Unknown
        } else {
            Field::Known(text)
        }
    }
}
