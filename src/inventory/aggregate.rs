// src/inventory/aggregate.rs

use super::{AggregationResult, Category, Item, UnresolvedEntry};
use std::collections::BTreeMap;

/// Accumulates counts and unresolved entries. Counters only ever grow.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    monitors: u64,
    docks: u64,
    labelled: BTreeMap<Category, BTreeMap<String, u64>>,
    unresolved: Vec<UnresolvedEntry>,
}

fn add_labelled(map: &mut BTreeMap<String, u64>, label: &str, count: u64) {
    let slot = map.entry(label.to_string()).or_insert(0);
    *slot = slot.saturating_add(count);
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` items. Labelled items are tallied per label.
    pub fn record(&mut self, item: &Item, count: u64) {
        match item {
            Item::Monitor => self.monitors = self.monitors.saturating_add(count),
            Item::Dock => self.docks = self.docks.saturating_add(count),
            Item::Desktop(label)
            | Item::Laptop(label)
            | Item::Phone(label)
            | Item::Bag(label)
            | Item::Charger(label)
            | Item::Headset(label) => {
                add_labelled(self.labelled.entry(item.category()).or_default(), label, count)
            }
        }
    }

    pub fn record_unresolved(&mut self, text: &str, sender: &str, received_time: &str) {
        self.unresolved.push(UnresolvedEntry {
            text: text.to_string(),
            sender: sender.to_string(),
            received_time: received_time.to_string(),
        });
    }

    pub fn unresolved(&self) -> &[UnresolvedEntry] {
        &self.unresolved
    }

    /// Fold another aggregator in; `other`'s unresolved entries follow ours.
    pub fn merge(&mut self, other: Aggregator) {
        self.monitors = self.monitors.saturating_add(other.monitors);
        self.docks = self.docks.saturating_add(other.docks);
        for (category, labels) in other.labelled {
            let mine = self.labelled.entry(category).or_default();
            for (label, total) in labels {
                add_labelled(mine, &label, total);
            }
        }
        self.unresolved.extend(other.unresolved);
    }

    /// Snapshot of the current state. Does not mutate, so it can be called again.
    pub fn assemble(&self) -> AggregationResult {
        let keyed = |c: Category| self.labelled.get(&c).cloned().unwrap_or_default();

        AggregationResult {
            monitors: self.monitors,
            docks: self.docks,
            desktops: keyed(Category::Desktops),
            laptops: keyed(Category::Laptops),
            phones: keyed(Category::Phones),
            bags: keyed(Category::Bags),
            chargers: keyed(Category::Chargers),
            headsets: keyed(Category::Headsets),
            unresolved: self.unresolved.clone(),
        }
    }
}
