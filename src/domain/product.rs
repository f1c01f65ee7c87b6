use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, Serializer};

use super::card::CardRecord;

/// Grouping key for records sharing a release; also the output file stem
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the JSON document written for this product
    pub fn json_file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Records assigned to one product, in encounter order, keyed by identity
#[derive(Debug, Clone)]
pub struct ProductGrouping {
    id: ProductId,
    image_dir: PathBuf,
    records: Vec<CardRecord>,
    index: HashMap<String, usize>,
}

impl ProductGrouping {
    pub fn new(id: ProductId, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            image_dir: image_dir.into(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    pub fn get(&self, identity_key: &str) -> Option<&CardRecord> {
        self.index.get(identity_key).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn get_mut(&mut self, identity_key: &str) -> Option<&mut CardRecord> {
        let i = *self.index.get(identity_key)?;
        self.records.get_mut(i)
    }

    /// Caller guarantees the identity key is not present yet
    pub(crate) fn insert(&mut self, record: CardRecord) {
        self.index
            .insert(record.identity_key.clone(), self.records.len());
        self.records.push(record);
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut CardRecord> {
        self.records.iter_mut()
    }
}

/// Serializes as the persisted product document: identity key -> record
impl Serialize for ProductGrouping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.records
                .iter()
                .map(|record| (record.identity_key.as_str(), record)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_keeps_encounter_order_in_document() {
        let mut grouping = ProductGrouping::new(ProductId::new("dal"), "images/dal");
        grouping.insert(CardRecord::new("DAL/W79-010", "Zed", "C"));
        grouping.insert(CardRecord::new("DAL/W79-002", "Amy", "U"));

        let json = serde_json::to_string(&grouping).unwrap();
        let zed = json.find("DAL/W79-010").unwrap();
        let amy = json.find("DAL/W79-002").unwrap();
        assert!(zed < amy);
        assert_eq!(grouping.get("DAL/W79-002").unwrap().name, "Amy");
        assert_eq!(grouping.len(), 2);
    }

    #[test]
    fn test_product_id_file_name() {
        let id = ProductId::new("xyz-001-pr");
        assert_eq!(id.json_file_name(), "xyz-001-pr.json");
        assert_eq!(id.to_string(), "xyz-001-pr");
    }
}
