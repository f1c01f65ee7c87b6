//! Product Aggregator
//!
//! Assigns extracted records to product groupings. A second extraction of an
//! identity already present in its grouping only contributes its rarity.

use tracing::debug;

use super::context::CrawlContext;
use super::grouping::GroupingResolver;
use crate::domain::{CardRecord, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    /// Rarity appended to an existing record; the incoming record was discarded
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub product_id: ProductId,
    /// The grouping was created by this call and needs a fresh image directory
    pub product_created: bool,
    pub kind: RecordOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct ProductAggregator {
    resolver: GroupingResolver,
}

impl ProductAggregator {
    pub fn new(resolver: GroupingResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &GroupingResolver {
        &self.resolver
    }

    /// Resolve the record's product and add or merge it
    pub fn aggregate(&self, ctx: &mut CrawlContext, record: CardRecord) -> MergeOutcome {
        let id = self
            .resolver
            .resolve(&record.identity_key, &record.product_name_raw, record.latest_rarity());
        self.add_or_merge(ctx, id, record)
    }

    pub fn add_or_merge(&self, ctx: &mut CrawlContext, id: ProductId, record: CardRecord) -> MergeOutcome {
        let (grouping, product_created) = ctx.ensure_product(&id);

        let kind = match grouping.get_mut(&record.identity_key) {
            Some(existing) => {
                debug!(
                    "Merging rarity {} into {} ({})",
                    record.latest_rarity(),
                    existing.identity_key,
                    id
                );
                existing.push_rarity(record.latest_rarity());
                RecordOutcome::Merged
            }
            None => {
                grouping.insert(record);
                RecordOutcome::Inserted
            }
        };
        if kind == RecordOutcome::Merged {
            ctx.stats.records_merged += 1;
        }

        MergeOutcome {
            product_id: id,
            product_created,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, name: &str, rarity: &str, product_raw: &str) -> CardRecord {
        let mut record = CardRecord::new(key, name, rarity);
        record.product_name_raw = product_raw.to_string();
        record
    }

    #[test]
    fn test_duplicate_identity_merges_rarity_in_encounter_order() {
        let aggregator = ProductAggregator::default();
        let mut ctx = CrawlContext::new("images");

        let first = aggregator.aggregate(&mut ctx, record("DAL/W79-001", "十香", "RR", "-ブースター"));
        let mut second_record = record("DAL/W79-001", "ignored", "SP", "-ブースター");
        second_record.name = "different".to_string();
        let second = aggregator.aggregate(&mut ctx, second_record);

        assert!(first.product_created);
        assert_eq!(first.kind, RecordOutcome::Inserted);
        assert!(!second.product_created);
        assert_eq!(second.kind, RecordOutcome::Merged);

        let grouping = ctx.product(&ProductId::new("dal-w79")).unwrap();
        assert_eq!(grouping.len(), 1);
        let merged = grouping.get("DAL/W79-001").unwrap();
        assert_eq!(merged.rarity_variants(), ["RR", "SP"]);
        assert_eq!(merged.name, "十香");
        assert_eq!(ctx.stats.records_merged, 1);
    }

    #[test]
    fn test_same_identity_in_different_products_stays_separate() {
        let aggregator = ProductAggregator::default();
        let mut ctx = CrawlContext::new("images");

        aggregator.aggregate(&mut ctx, record("DAL/W79-001", "A", "R", "booster"));
        let promo = aggregator.aggregate(&mut ctx, record("DAL/W79-001", "A", "PR", "PR card"));

        assert!(promo.product_created);
        assert_eq!(ctx.product_count(), 2);
        assert_eq!(ctx.record_count(), 2);
    }

    #[test]
    fn test_new_identity_in_existing_product_is_inserted() {
        let aggregator = ProductAggregator::default();
        let mut ctx = CrawlContext::new("images");

        aggregator.aggregate(&mut ctx, record("DAL/W79-001", "A", "R", "booster"));
        let outcome = aggregator.aggregate(&mut ctx, record("DAL/W79-002", "B", "C", "booster"));

        assert!(!outcome.product_created);
        assert_eq!(outcome.kind, RecordOutcome::Inserted);
        let grouping = ctx.product(&outcome.product_id).unwrap();
        let keys: Vec<&str> = grouping.records().iter().map(|r| r.identity_key.as_str()).collect();
        assert_eq!(keys, ["DAL/W79-001", "DAL/W79-002"]);
        assert_eq!(ctx.stats.records_merged, 0);
    }

    #[test]
    fn test_new_product_gets_image_dir_under_root() {
        let aggregator = ProductAggregator::default();
        let mut ctx = CrawlContext::new("out/images");

        let outcome = aggregator.aggregate(&mut ctx, record("XYZ/001", "B", "R", "promo"));

        let grouping = ctx.product(&outcome.product_id).unwrap();
        assert_eq!(outcome.product_id.as_str(), "xyz-001-pr");
        assert_eq!(grouping.image_dir(), std::path::Path::new("out/images/xyz-001-pr"));
    }
}
