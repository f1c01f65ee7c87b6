//! Canonical card record extracted from one catalog row
//!
//! Every record starts fully populated with explicit unknown markers and is
//! filled in by the row parser. Only the aggregator appends rarity variants
//! and only the cross-linker touches the link set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

/// Marker persisted for any field whose source value was missing or unrecognized
pub const UNKNOWN_MARKER: &str = "-";

/// A field value that may be unknown
///
/// Serializes as the inner value when known and as [`UNKNOWN_MARKER`] otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Known(T),
    Unknown,
}

impl<T> Field<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(value) => value.serialize(serializer),
            Self::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

/// Card category normalized from the localized type token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Character,
    Climax,
    Event,
    #[default]
    #[serde(rename = "-")]
    Unknown,
}

/// Card color normalized from the color icon file name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Red,
    Green,
    Blue,
    #[default]
    #[serde(rename = "-")]
    Unknown,
}

/// One physical card printing, shared by all of its rarity variants
///
/// The serialized form is the persisted projection: the identity key becomes
/// the map key of the product document, and the raw product name and image
/// URL never leave the extraction stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    #[serde(skip)]
    pub identity_key: String,
    pub name: String,
    #[serde(skip)]
    pub product_name_raw: String,
    pub product_name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub level: Field<u32>,
    pub power: Field<u32>,
    pub cost: Field<u32>,
    #[serde(rename = "rarity")]
    pub(crate) rarity_variants: Vec<String>,
    #[serde(rename = "trait")]
    pub traits: Field<Vec<String>>,
    pub color: Color,
    #[serde(rename = "soul")]
    pub soul_count: Field<u32>,
    #[serde(rename = "link")]
    pub(crate) linked_identities: BTreeSet<String>,
    #[serde(rename = "effect")]
    pub effect_text: Field<String>,
    #[serde(skip)]
    pub image_url: Option<String>,
}

impl CardRecord {
    /// Create a record with every optional field set to its unknown marker
    pub fn new(
        identity_key: impl Into<String>,
        name: impl Into<String>,
        rarity: impl Into<String>,
    ) -> Self {
        Self {
            identity_key: identity_key.into(),
            name: name.into(),
            product_name_raw: String::new(),
            product_name: UNKNOWN_MARKER.to_string(),
            category: Category::Unknown,
            level: Field::Unknown,
            power: Field::Unknown,
            cost: Field::Unknown,
            rarity_variants: vec![rarity.into()],
            traits: Field::Unknown,
            color: Color::Unknown,
            soul_count: Field::Unknown,
            linked_identities: BTreeSet::new(),
            effect_text: Field::Unknown,
            image_url: None,
        }
    }

    pub fn rarity_variants(&self) -> &[String] {
        &self.rarity_variants
    }

    /// Most recently recorded rarity; for a freshly extracted record, its only one
    pub fn latest_rarity(&self) -> &str {
        self.rarity_variants.last().map_or(UNKNOWN_MARKER, String::as_str)
    }

    pub(crate) fn push_rarity(&mut self, rarity: impl Into<String>) {
        self.rarity_variants.push(rarity.into());
    }

    pub fn linked_identities(&self) -> &BTreeSet<String> {
        &self.linked_identities
    }

    /// File name of the artwork for the latest rarity variant,
    /// e.g. `DAL/W79-001` + `PR-S` -> `001pr-s.png`
    ///
    /// Keys without a `-` keep their whole text, so a `/` is flattened to `_`
    /// to stay inside the product image directory.
    pub fn image_file_name(&self) -> String {
        let serial = self
            .identity_key
            .rsplit('-')
            .next()
            .unwrap_or(&self.identity_key)
            .replace('/', "_");
        format!("{serial}{}.png", self.latest_rarity()).to_lowercase()
    }
}
