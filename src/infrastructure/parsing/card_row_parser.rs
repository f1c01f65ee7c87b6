//! Card row parser
//!
//! Turns one catalog row into a canonical [`CardRecord`]. A row without the
//! title block, the name span or the card number span is a structural
//! failure reported as [`ParsingError`]; every other missing piece falls back
//! to the unknown marker.

use anyhow::Result;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::trace;
use url::Url;

use super::config::{CardListSelectors, FieldLabels, ParsingConfig};
use super::normalizer::FieldNormalizer;
use super::{ParsingError, ParsingResult};
use crate::domain::{CardRecord, Field};

/// One recognized field-bearing unit of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitField {
    Category(String),
    Level(String),
    Power(String),
    Cost(String),
    Rarity(String),
    Trait(String),
    ColorIcon(String),
    SoulCount(usize),
}

/// Raw unit values of one row; later units overwrite earlier ones
#[derive(Debug, Default)]
struct RawUnits {
    category: Option<String>,
    level: Option<String>,
    power: Option<String>,
    cost: Option<String>,
    rarity: Option<String>,
    traits: Option<String>,
    color_icon: Option<String>,
    soul_count: usize,
}

impl RawUnits {
    fn absorb(&mut self, field: UnitField) {
        match field {
            UnitField::Category(v) => self.category = Some(v),
            UnitField::Level(v) => self.level = Some(v),
            UnitField::Power(v) => self.power = Some(v),
            UnitField::Cost(v) => self.cost = Some(v),
            UnitField::Rarity(v) => self.rarity = Some(v),
            UnitField::Trait(v) => self.traits = Some(v),
            UnitField::ColorIcon(v) => self.color_icon = Some(v),
            UnitField::SoulCount(n) => self.soul_count = n,
        }
    }
}

/// Parser for a single card row
pub struct CardRowParser {
    row: Selector,
    title: Selector,
    highlight: Selector,
    title_link: Selector,
    image: Selector,
    unit: Selector,
    unit_icon: Selector,
    effect: Selector,
    labels: FieldLabels,
    normalizer: FieldNormalizer,
    base_url: Url,
}

impl CardRowParser {
    /// Create a new row parser with the default catalog configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create parser with custom selectors, labels and lookup tables
    pub fn with_config(config: &ParsingConfig) -> Result<Self> {
        let selectors: &CardListSelectors = &config.card_list_selectors;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ParsingError::url_resolution_failed(&config.base_url, &e.to_string(), None)
        })?;

        Ok(Self {
            row: compile_selector("tr")?,
            title: compile_selector(&selectors.title)?,
            highlight: compile_selector(&selectors.highlight)?,
            title_link: compile_selector(&selectors.title_link)?,
            image: compile_selector(&selectors.image)?,
            unit: compile_selector(&selectors.unit)?,
            unit_icon: compile_selector(&selectors.unit_icon)?,
            effect: compile_selector(&selectors.effect)?,
            labels: config.field_labels.clone(),
            normalizer: FieldNormalizer::new(config.normalizer.clone()),
            base_url,
        })
    }

    /// Parse a standalone `<tr>` fragment as handed out by a catalog source
    pub fn parse_fragment(&self, fragment: &str) -> ParsingResult<CardRecord> {
        // A bare <tr> is dropped by the HTML parser outside of a table.
        let html = Html::parse_fragment(&format!("<table><tbody>{fragment}</tbody></table>"));
        let row = html
            .select(&self.row)
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("row", Some("row fragment")))?;
        self.parse_row(&row)
    }

    /// Parse one row element into a record
    pub fn parse_row(&self, row: &ElementRef) -> ParsingResult<CardRecord> {
        let title = row
            .select(&self.title)
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("title", Some("card row")))?;

        let mut spans = title.select(&self.highlight).map(|span| element_text(&span));
        let name = spans
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("name", Some("title block")))?;
        let raw_code = spans
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("card_no", Some("title block")))?;

        let mut units = RawUnits::default();
        for field in row.select(&self.unit).filter_map(|unit| self.classify_unit(&unit)) {
            units.absorb(field);
        }

        let rarity = self.normalizer.rarity(&raw_code, units.rarity.as_deref());
        let mut record = CardRecord::new(FieldNormalizer::identity_key(&raw_code), name, rarity);

        let product_name_raw = self.product_name_raw(&title);
        record.product_name = FieldNormalizer::product_name(&product_name_raw);
        record.product_name_raw = product_name_raw;
        record.category = self.normalizer.category(units.category.as_deref());
        record.level = FieldNormalizer::number(units.level.as_deref());
        record.power = FieldNormalizer::number(units.power.as_deref());
        record.cost = FieldNormalizer::number(units.cost.as_deref());
        record.traits = self.normalizer.traits(units.traits.as_deref());
        record.color = self.normalizer.color(units.color_icon.as_deref());
        record.soul_count = FieldNormalizer::soul(units.soul_count);
        record.effect_text = self.effect_text(row);
        record.image_url = self.image_url(row)?;

        trace!("Parsed card row {} ({})", record.identity_key, record.name);
        Ok(record)
    }

    /// Classify a unit by its leading label; unrecognized units yield `None`
    pub fn classify_unit(&self, unit: &ElementRef) -> Option<UnitField> {
        let text = element_text(unit);
        let labels = &self.labels;

        let labelled: [(&str, fn(String) -> UnitField); 6] = [
            (labels.category.as_str(), UnitField::Category),
            (labels.level.as_str(), UnitField::Level),
            (labels.power.as_str(), UnitField::Power),
            (labels.cost.as_str(), UnitField::Cost),
            (labels.rarity.as_str(), UnitField::Rarity),
            (labels.traits.as_str(), UnitField::Trait),
        ];
        for (label, make) in labelled {
            if let Some(value) = text.strip_prefix(label) {
                return Some(make(value.trim().to_string()));
            }
        }

        let markup = unit.html();
        if markup.contains(labels.color.as_str()) {
            let icon = unit
                .select(&self.unit_icon)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(icon_file_name);
            if let Some(icon) = icon {
                return Some(UnitField::ColorIcon(icon));
            }
        }
        if markup.contains(labels.soul.as_str()) {
            return Some(UnitField::SoulCount(
                markup.matches(labels.soul_icon.as_str()).count(),
            ));
        }
        None
    }

    /// Plain text right after the first link of the title block
    fn product_name_raw(&self, title: &ElementRef) -> String {
        let Some(link) = title.select(&self.title_link).next() else {
            return String::new();
        };
        match link.next_sibling() {
            Some(node) => match node.value() {
                Node::Text(text) => text.trim().to_string(),
                Node::Element(_) => ElementRef::wrap(node)
                    .map(|e| e.html().trim().to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            },
            None => String::new(),
        }
    }

    fn effect_text(&self, row: &ElementRef) -> Field<String> {
        row.select(&self.effect)
            .next()
            .map_or(Field::Unknown, |span| FieldNormalizer::effect(&span.inner_html()))
    }

    fn image_url(&self, row: &ElementRef) -> ParsingResult<Option<String>> {
        let Some(src) = row
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
        else {
            return Ok(None);
        };
        self.base_url
            .join(src)
            .map(|url| Some(url.to_string()))
            .map_err(|e| {
                ParsingError::url_resolution_failed(src, &e.to_string(), Some(self.base_url.as_str()))
            })
    }
}

pub(super) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn icon_file_name(src: &str) -> String {
    src.rsplit('/').next().unwrap_or(src).to_string()
}
