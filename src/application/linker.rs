//! Cross-Linker
//!
//! Links records whose effect text mentions another record's name. Runs once
//! over every grouping after aggregation, since links cross product
//! boundaries. Links are symmetric even though the name test is directional.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::context::CrawlContext;
use crate::domain::CardRecord;

/// Name and effect text of one distinct identity
#[derive(Debug, Clone)]
struct LinkCandidate<'a> {
    key: &'a str,
    name: &'a str,
    effect: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CrossLinker;

impl CrossLinker {
    pub fn new() -> Self {
        Self
    }

    /// Link sets per identity key for a collection of records
    ///
    /// The first record seen for an identity supplies its name and effect.
    /// Records with an empty name never match, and nothing links to itself.
    pub fn compute_links<'a>(
        &self,
        records: impl IntoIterator<Item = &'a CardRecord>,
    ) -> BTreeMap<String, BTreeSet<String>> {
        let mut seen = BTreeSet::new();
        let candidates: Vec<LinkCandidate<'a>> = records
            .into_iter()
            .filter(|record| seen.insert(record.identity_key.as_str()))
            .map(|record| LinkCandidate {
                key: record.identity_key.as_str(),
                name: record.name.as_str(),
                effect: record.effect_text.as_known().map(String::as_str),
            })
            .collect();

        let mut links: BTreeMap<String, BTreeSet<String>> = candidates
            .iter()
            .map(|c| (c.key.to_string(), BTreeSet::new()))
            .collect();

        for target in &candidates {
            let Some(effect) = target.effect else {
                continue;
            };
            for source in &candidates {
                if source.key == target.key || source.name.is_empty() || !effect.contains(source.name) {
                    continue;
                }
                if let Some(set) = links.get_mut(target.key) {
                    set.insert(source.key.to_string());
                }
                if let Some(set) = links.get_mut(source.key) {
                    set.insert(target.key.to_string());
                }
            }
        }

        links
    }

    /// Replace every record's link set; returns the number of linked pairs
    pub fn link(&self, ctx: &mut CrawlContext) -> usize {
        let links = self.compute_links(ctx.products().flat_map(|g| g.records()));
        let pair_count = links.values().map(BTreeSet::len).sum::<usize>() / 2;

        for grouping in ctx.products_mut() {
            for record in grouping.records_mut() {
                record.linked_identities = links.get(&record.identity_key).cloned().unwrap_or_default();
            }
        }

        info!("Cross-linked {} card pairs", pair_count);
        pair_count
    }
}
