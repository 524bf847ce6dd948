// src/inventory/mod.rs

mod aggregate;
mod matchers;
mod normalize;
mod registry;
mod segment;

pub use aggregate::Aggregator;
pub use registry::{ModelRegistry, RegistryError};
pub use segment::ReportPreprocessor;

use matchers::{Extraction, MatcherCascade};
use segment::segment;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One free-text report as handed over by the mail side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputReport {
    #[serde(default)]
    pub body: Option<String>,
    pub sender: String,
    pub received_time: String,
}

/// Hardware categories the classifier counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Monitors,
    Desktops,
    Laptops,
    Phones,
    Bags,
    Chargers,
    Docks,
    Headsets,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Monitors,
        Category::Desktops,
        Category::Laptops,
        Category::Phones,
        Category::Bags,
        Category::Chargers,
        Category::Docks,
        Category::Headsets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Monitors => "monitors",
            Category::Desktops => "desktops",
            Category::Laptops => "laptops",
            Category::Phones => "phones",
            Category::Bags => "bags",
            Category::Chargers => "chargers",
            Category::Docks => "docks",
            Category::Headsets => "headsets",
        }
    }

}

/// One counted thing. Monitors and docks are plain totals; every other
/// category is tallied under the label it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Monitor,
    Dock,
    Desktop(String),
    Laptop(String),
    Phone(String),
    Bag(String),
    Charger(String),
    Headset(String),
}

impl Item {
    /// Item of `category` under `label`; monitors and docks drop the label.
    pub fn new(category: Category, label: impl Into<String>) -> Self {
        let label = label.into();
        match category {
            Category::Monitors => Item::Monitor,
            Category::Docks => Item::Dock,
            Category::Desktops => Item::Desktop(label),
            Category::Laptops => Item::Laptop(label),
            Category::Phones => Item::Phone(label),
            Category::Bags => Item::Bag(label),
            Category::Chargers => Item::Charger(label),
            Category::Headsets => Item::Headset(label),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Item::Monitor => Category::Monitors,
            Item::Dock => Category::Docks,
            Item::Desktop(_) => Category::Desktops,
            Item::Laptop(_) => Category::Laptops,
            Item::Phone(_) => Category::Phones,
            Item::Bag(_) => Category::Bags,
            Item::Charger(_) => Category::Chargers,
            Item::Headset(_) => Category::Headsets,
        }
    }
}

/// A line (or part of one) that needs a human to reconcile it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEntry {
    pub text: String,
    pub sender: String,
    pub received_time: String,
}

/// Final tallies for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub monitors: u64,
    pub docks: u64,
    pub desktops: BTreeMap<String, u64>,
    pub laptops: BTreeMap<String, u64>,
    pub phones: BTreeMap<String, u64>,
    pub bags: BTreeMap<String, u64>,
    pub chargers: BTreeMap<String, u64>,
    pub headsets: BTreeMap<String, u64>,
    pub unresolved: Vec<UnresolvedEntry>,
}

impl AggregationResult {
    /// Total for a category, summing labels for keyed ones.
    pub fn total(&self, category: Category) -> u64 {
        let keyed = match category {
            Category::Monitors => return self.monitors,
            Category::Docks => return self.docks,
            Category::Desktops => &self.desktops,
            Category::Laptops => &self.laptops,
            Category::Phones => &self.phones,
            Category::Bags => &self.bags,
            Category::Chargers => &self.chargers,
            Category::Headsets => &self.headsets,
        };
        keyed.values().fold(0u64, |acc, &n| acc.saturating_add(n))
    }
}

/// Drives reports through segmentation and the matcher cascade.
pub struct InventoryParser {
    cascade: MatcherCascade,
    preprocessor: ReportPreprocessor,
}

impl InventoryParser {
    pub fn new(registry: ModelRegistry, preprocessor: ReportPreprocessor) -> Self {
        Self {
            cascade: MatcherCascade::new(registry),
            preprocessor,
        }
    }

    pub fn parse_reports<'a, I>(&self, reports: I) -> AggregationResult
    where
        I: IntoIterator<Item = &'a InputReport>,
    {
        let mut run = Aggregator::new();
        let mut count = 0usize;
        for report in reports {
            run.merge(self.parse_report(report));
            count += 1;
        }

        let result = run.assemble();
        info!(
            reports = count,
            monitors = result.monitors,
            docks = result.docks,
            desktops = result.total(Category::Desktops),
            laptops = result.total(Category::Laptops),
            phones = result.total(Category::Phones),
            unresolved = result.unresolved.len(),
            "Reports parsed"
        );
        result
    }

    /// Classify one report into its own aggregator.
    pub fn parse_report(&self, report: &InputReport) -> Aggregator {
        let mut agg = Aggregator::new();

        let Some(body) = report.body.as_deref() else {
            warn!(
                sender = %report.sender,
                received = %report.received_time,
                "Report has no body"
            );
            agg.record_unresolved("", &report.sender, &report.received_time);
            return agg;
        };

        for line in segment(self.preprocessor.prepare(body)) {
            let (matcher, extractions) = self.cascade.classify(line);
            debug!(matcher, line, extractions = extractions.len(), "Line classified");
            for extraction in extractions {
                match extraction {
                    Extraction::Counted { item, count } => agg.record(&item, count),
                    Extraction::Unresolved { text } => {
                        agg.record_unresolved(&text, &report.sender, &report.received_time)
                    }
                }
            }
        }
        debug!(
            sender = %report.sender,
            unresolved = agg.unresolved().len(),
            "Report classified"
        );
        agg
    }
}
