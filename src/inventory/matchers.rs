// src/inventory/matchers.rs

use super::normalize::{normalize, tokens};
use super::registry::ModelRegistry;
use super::{Category, Item};
use regex::Regex;
use std::sync::LazyLock;

/// "X6 24” screens": count marker at the very start of the line.
static LEADING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^x(\d+)\s+(.+)$").expect("leading-count pattern"));

/// "4 x monitors", "19x Samsung A35s": start of one occurrence.
static OCCURRENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\s*[xX×]\s+").expect("occurrence pattern"));

static LEADING_MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(?:\D|$)").expect("leading model pattern"));

static CATEGORY_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(laptop|desktop)s?\s+(\d{4})$").expect("category-model pattern")
});

const SEPARATORS: [char; 3] = [',', ';', '\n'];

/// Words that join items but carry no content of their own.
const CONNECTORS: [&str; 2] = ["and", "plus"];

/// What a matcher pulled out of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Counted {
        item: Item,
        count: u64,
    },
    Unresolved {
        text: String,
    },
}

impl Extraction {
    fn counted(item: Item, count: u64) -> Self {
        Extraction::Counted { item, count }
    }

    fn unresolved(text: &str) -> Self {
        Extraction::Unresolved {
            text: text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(Vec<Extraction>),
    Declined,
}

/// One rule of the cascade. `line` is a trimmed, non-empty raw line.
pub trait LineMatcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, line: &str, registry: &ModelRegistry) -> MatchOutcome;
}

/// The rules in priority order; the first one that matches owns the line.
pub struct MatcherCascade {
    registry: ModelRegistry,
    matchers: Vec<Box<dyn LineMatcher>>,
}

impl MatcherCascade {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            matchers: vec![
                Box::new(LeadingCount),
                Box::new(GenericCount),
                Box::new(CategoryModel),
                Box::new(BareMention),
            ],
        }
    }

    /// Returns the accepting matcher's name and its extractions.
    pub fn classify(&self, line: &str) -> (&'static str, Vec<Extraction>) {
        self.matchers
            .iter()
            .find_map(|m| match m.apply(line, &self.registry) {
                MatchOutcome::Matched(found) => Some((m.name(), found)),
                MatchOutcome::Declined => None,
            })
            .unwrap_or_else(|| ("none", vec![Extraction::unresolved(line)]))
    }
}

// ---------------------------------------------------------------------------
// Leading-count form
// ---------------------------------------------------------------------------

struct LeadingCount;

impl LineMatcher for LeadingCount {
    fn name(&self) -> &'static str {
        "leading_count"
    }

    fn apply(&self, line: &str, registry: &ModelRegistry) -> MatchOutcome {
        let Some(caps) = LEADING_COUNT.captures(line) else {
            return MatchOutcome::Declined;
        };
        // The whole line is one statement, whatever it turns out to be.
        let Ok(count) = caps[1].parse::<u64>() else {
            return MatchOutcome::Matched(vec![Extraction::unresolved(line)]);
        };
        let remainder = normalize(&caps[2]);

        let extraction = if mentions_monitor(&remainder) {
            Extraction::counted(Item::Monitor, count)
        } else {
            match leading_model(&remainder).and_then(|m| registry.lookup_numeric(m)) {
                Some((category, label)) => Extraction::counted(Item::new(category, label), count),
                None => Extraction::unresolved(line),
            }
        };
        MatchOutcome::Matched(vec![extraction])
    }
}

// ---------------------------------------------------------------------------
// Generic "<count> x <description>" form
// ---------------------------------------------------------------------------

struct GenericCount;

impl LineMatcher for GenericCount {
    fn name(&self) -> &'static str {
        "generic_count"
    }

    fn apply(&self, line: &str, registry: &ModelRegistry) -> MatchOutcome {
        let markers: Vec<regex::Captures<'_>> = OCCURRENCE.captures_iter(line).collect();
        let Some(first) = markers.first().and_then(|c| c.get(0)) else {
            return MatchOutcome::Declined;
        };

        let mut found = Vec::new();
        push_residual(&line[..first.start()], &mut found);

        for (i, caps) in markers.iter().enumerate() {
            let Some(marker) = caps.get(0) else { continue };
            let next_start = markers
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map_or(line.len(), |m| m.start());

            // Description runs to the next separator or the next occurrence.
            let tail = &line[marker.end()..next_start];
            let desc_len = tail.find(SEPARATORS).unwrap_or(tail.len());
            let occurrence = &line[marker.start()..marker.end() + desc_len];

            found.push(match caps[1].parse::<u64>() {
                Ok(count) => classify_occurrence(&tail[..desc_len], count, occurrence, registry),
                Err(_) => Extraction::unresolved(occurrence),
            });
            push_residual(&tail[desc_len..], &mut found);
        }
        MatchOutcome::Matched(found)
    }
}

/// Text between occurrences that is more than separators and connectors.
fn push_residual(text: &str, found: &mut Vec<Extraction>) {
    for piece in text.split(SEPARATORS) {
        if !trim_connectors(&normalize(piece)).is_empty() {
            found.push(Extraction::unresolved(piece));
        }
    }
}

/// Category cascade for one occurrence; first rule that applies wins.
fn classify_occurrence(
    raw_description: &str,
    count: u64,
    occurrence: &str,
    registry: &ModelRegistry,
) -> Extraction {
    let normalized = normalize(raw_description);
    let desc = trim_connectors(&normalized);

    // An unregistered numeral does not commit; "5220 polywire headset" is a headset.
    if let Some((category, label)) = leading_model(desc).and_then(|m| registry.lookup_numeric(m)) {
        return Extraction::counted(Item::new(category, label), count);
    }

    if mentions_phone(desc) {
        let model = registry
            .find_phone_model(desc)
            .unwrap_or_else(|| registry.default_phone_model());
        return phone_or_case(desc, model, count, occurrence);
    }

    if let Some(model) = registry.find_phone_model(desc) {
        return phone_or_case(desc, model, count, occurrence);
    }

    if mentions_monitor(desc) {
        return Extraction::counted(Item::Monitor, count);
    }

    if desc.contains("bag") {
        return if desc.contains("small") {
            Extraction::counted(Item::Bag("small".to_string()), count)
        } else if desc.contains("large") {
            Extraction::counted(Item::Bag("large".to_string()), count)
        } else {
            Extraction::unresolved(occurrence)
        };
    }

    if desc.contains("charger") {
        return Extraction::counted(Item::Charger(desc.to_string()), count);
    }

    if desc.contains("dock") {
        return Extraction::counted(Item::Dock, count);
    }

    if desc.contains("headset") {
        return Extraction::counted(Item::Headset(desc.to_string()), count);
    }

    Extraction::unresolved(occurrence)
}

fn phone_or_case(desc: &str, model: &str, count: u64, occurrence: &str) -> Extraction {
    if desc.contains("case") {
        Extraction::unresolved(occurrence)
    } else {
        Extraction::counted(Item::Phone(model.to_string()), count)
    }
}

// ---------------------------------------------------------------------------
// Bare "laptop 5666" form
// ---------------------------------------------------------------------------

struct CategoryModel;

impl LineMatcher for CategoryModel {
    fn name(&self) -> &'static str {
        "category_model"
    }

    fn apply(&self, line: &str, registry: &ModelRegistry) -> MatchOutcome {
        let normalized = normalize(line);
        let Some(caps) = CATEGORY_MODEL.captures(&normalized) else {
            return MatchOutcome::Declined;
        };
        let category = if &caps[1] == "laptop" {
            Category::Laptops
        } else {
            Category::Desktops
        };
        let extraction = match registry.is_model_of(category, &caps[2]) {
            Some(label) => Extraction::counted(Item::new(category, label), 1),
            None => Extraction::unresolved(line),
        };
        MatchOutcome::Matched(vec![extraction])
    }
}

// ---------------------------------------------------------------------------
// Bare model mentions anywhere in the line
// ---------------------------------------------------------------------------

struct BareMention;

impl LineMatcher for BareMention {
    fn name(&self) -> &'static str {
        "bare_mention"
    }

    fn apply(&self, line: &str, registry: &ModelRegistry) -> MatchOutcome {
        let normalized = normalize(line);
        let words: Vec<&str> = tokens(&normalized).collect();

        let mut found = Vec::new();
        let mut residual: Vec<&str> = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let token = words[i];
            match registry.lookup_token(token) {
                Some((Category::Phones, _)) if words.get(i + 1).is_some_and(|t| is_case(t)) => {
                    // Cases are not phones; keep "a35 case" for review.
                    residual.extend_from_slice(&words[i..i + 2]);
                    i += 2;
                    continue;
                }
                Some((category, label)) => {
                    found.push(Extraction::counted(Item::new(category, label), 1))
                }
                None if CONNECTORS.contains(&token) => {}
                None => residual.push(token),
            }
            i += 1;
        }

        if found.is_empty() {
            return MatchOutcome::Matched(vec![Extraction::unresolved(line)]);
        }
        if !residual.is_empty() {
            found.push(Extraction::unresolved(&residual.join(" ")));
        }
        MatchOutcome::Matched(found)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// "phone", "iphones", "telephone", "smartphone"; not "headphones".
fn mentions_phone(normalized: &str) -> bool {
    normalized
        .match_indices("phone")
        .any(|(at, _)| !normalized[..at].ends_with("head"))
}

fn mentions_monitor(normalized: &str) -> bool {
    normalized.contains("monitor") || normalized.contains("screen")
}

fn leading_model(normalized: &str) -> Option<&str> {
    LEADING_MODEL
        .captures(normalized)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn is_case(token: &str) -> bool {
    token == "case" || token == "cases"
}

fn trim_connectors(normalized: &str) -> &str {
    let mut desc = normalized.trim();
    while let Some((head, last)) = desc.rsplit_once(' ') {
        if !CONNECTORS.contains(&last) {
            break;
        }
        desc = head.trim_end();
    }
    if CONNECTORS.contains(&desc) { "" } else { desc }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        ModelRegistry::new(
            &["3000", "3010"],
            &["5330", "5340", "5531", "5540", "5666"],
            &["A32", "A34", "A35"],
            "A35",
        )
        .unwrap()
    }

    fn classify(line: &str) -> (&'static str, Vec<Extraction>) {
        MatcherCascade::new(registry()).classify(line)
    }

    fn counted(category: Category, label: &str, count: u64) -> Extraction {
        Extraction::counted(Item::new(category, label), count)
    }

    fn scalar(item: Item, count: u64) -> Extraction {
        Extraction::counted(item, count)
    }

    fn unresolved(text: &str) -> Extraction {
        Extraction::unresolved(text)
    }

    #[test]
    fn generic_monitors() {
        assert_eq!(
            classify("4 x monitors"),
            ("generic_count", vec![scalar(Item::Monitor, 4)])
        );
    }

    #[test]
    fn leading_count_screens() {
        assert_eq!(
            classify("X6 24” screens"),
            ("leading_count", vec![scalar(Item::Monitor, 6)])
        );
    }

    #[test]
    fn leading_count_routes_models_and_rejects_unknown_numerals() {
        assert_eq!(
            classify("x3 3010 desktops").1,
            vec![counted(Category::Desktops, "3010", 3)]
        );
        assert_eq!(
            classify("X2 5540 with chargers").1,
            vec![counted(Category::Laptops, "5540", 2)]
        );
        assert_eq!(
            classify("X2 5220 polywire headsets").1,
            vec![unresolved("X2 5220 polywire headsets")]
        );
        assert_eq!(classify("x4 keyboards").1, vec![unresolved("x4 keyboards")]);
    }

    #[test]
    fn leading_count_consumes_the_whole_line() {
        // The embedded "2 x docks" is not decomposed further.
        let (name, found) = classify("X1 monitor, 2 x docks");
        assert_eq!(name, "leading_count");
        assert_eq!(found, vec![scalar(Item::Monitor, 1)]);
    }

    #[test]
    fn phones_and_cases_split_into_occurrences() {
        assert_eq!(
            classify("19 x Samsung A35s and 19 x Samsung A35 cases").1,
            vec![
                counted(Category::Phones, "A35", 19),
                unresolved("19 x Samsung A35 cases"),
            ]
        );
    }

    #[test]
    fn phone_without_model_uses_default() {
        assert_eq!(
            classify("3 x mobile phones").1,
            vec![counted(Category::Phones, "A35", 3)]
        );
        assert_eq!(
            classify("2 x Samsung phone A32").1,
            vec![counted(Category::Phones, "A32", 2)]
        );
        assert_eq!(
            classify("1 x phone case").1,
            vec![unresolved("1 x phone case")]
        );
    }

    #[test]
    fn any_phone_spelling_counts_as_a_phone() {
        assert_eq!(
            classify("2 x iPhones").1,
            vec![counted(Category::Phones, "A35", 2)]
        );
        assert_eq!(
            classify("3 x telephones").1,
            vec![counted(Category::Phones, "A35", 3)]
        );
        assert_eq!(
            classify("1 x smartphone").1,
            vec![counted(Category::Phones, "A35", 1)]
        );
    }

    #[test]
    fn headphones_are_not_phones() {
        assert_eq!(
            classify("2 x headphones").1,
            vec![unresolved("2 x headphones")]
        );
        assert_eq!(
            classify("2 x headphones and phones").1,
            vec![counted(Category::Phones, "A35", 2)]
        );
        assert!(!mentions_phone("headphone"));
        assert!(mentions_phone("iphone"));
    }

    #[test]
    fn hyphenated_phone_models_are_found() {
        assert_eq!(
            classify("2 x galaxy-a32").1,
            vec![counted(Category::Phones, "A32", 2)]
        );
        assert_eq!(
            classify("1 x galaxy-a34 case").1,
            vec![unresolved("1 x galaxy-a34 case")]
        );
        let (name, found) = classify("Galaxy-A32 returned");
        assert_eq!(name, "bare_mention");
        assert_eq!(
            found,
            vec![counted(Category::Phones, "A32", 1), unresolved("galaxy returned")]
        );
    }

    #[test]
    fn registered_numerals_win_over_keywords() {
        assert_eq!(
            classify("2 x 5340 laptops with bags").1,
            vec![counted(Category::Laptops, "5340", 2)]
        );
    }

    #[test]
    fn bag_sizes_are_not_guessed() {
        assert_eq!(
            classify("2 x small laptop bags; 1 x Large bag; 3 x laptop bags").1,
            vec![
                counted(Category::Bags, "small", 2),
                counted(Category::Bags, "large", 1),
                unresolved("3 x laptop bags"),
            ]
        );
    }

    #[test]
    fn chargers_and_headsets_keep_their_description() {
        assert_eq!(
            classify("1 x 130W USB-C Charger, 1 x dock and 1 x 5220 polywire headset").1,
            vec![
                counted(Category::Chargers, "130w usb-c charger", 1),
                scalar(Item::Dock, 1),
                counted(Category::Headsets, "5220 polywire headset", 1),
            ]
        );
    }

    #[test]
    fn unknown_occurrence_keeps_its_own_text() {
        assert_eq!(
            classify("2 x widget, 4 x monitors").1,
            vec![unresolved("2 x widget"), scalar(Item::Monitor, 4)]
        );
    }

    #[test]
    fn residual_clauses_are_not_dropped() {
        assert_eq!(
            classify("Returned: 1 x dock, keyboard and 2 x monitors").1,
            vec![
                unresolved("Returned:"),
                scalar(Item::Dock, 1),
                unresolved("keyboard and"),
                scalar(Item::Monitor, 2),
            ]
        );
    }

    #[test]
    fn overflowing_count_is_unresolved() {
        assert_eq!(
            classify("99999999999999999999999 x monitors").1,
            vec![unresolved("99999999999999999999999 x monitors")]
        );
    }

    #[test]
    fn overflowing_leading_count_is_one_unresolved_entry() {
        assert_eq!(
            classify("X99999999999999999999999 screens"),
            (
                "leading_count",
                vec![unresolved("X99999999999999999999999 screens")]
            )
        );
    }

    #[test]
    fn category_model_form() {
        assert_eq!(
            classify("Laptop 5666"),
            ("category_model", vec![counted(Category::Laptops, "5666", 1)])
        );
        assert_eq!(
            classify("Desktop 3000").1,
            vec![counted(Category::Desktops, "3000", 1)]
        );
        // Wrong set is not silently moved to the other category.
        assert_eq!(classify("Laptop 3000").1, vec![unresolved("Laptop 3000")]);
    }

    #[test]
    fn bare_mentions_count_once_each_and_keep_residual() {
        let (name, found) = classify("Samsung A32 and 5340");
        assert_eq!(name, "bare_mention");
        assert_eq!(
            found,
            vec![
                counted(Category::Phones, "A32", 1),
                counted(Category::Laptops, "5340", 1),
                unresolved("samsung"),
            ]
        );
    }

    #[test]
    fn bare_mention_excludes_cases() {
        assert_eq!(
            classify("A34 cases").1,
            vec![unresolved("A34 cases")]
        );
        assert_eq!(
            classify("A35 and A34 case").1,
            vec![counted(Category::Phones, "A35", 1), unresolved("a34 case")]
        );
    }

    #[test]
    fn nothing_recognised_keeps_whole_line() {
        assert_eq!(
            classify("Please see below").1,
            vec![unresolved("Please see below")]
        );
    }

    #[test]
    fn trim_connectors_only_strips_trailing_joiners() {
        assert_eq!(trim_connectors("dock and"), "dock");
        assert_eq!(trim_connectors("dock and plus"), "dock");
        assert_eq!(trim_connectors("and"), "");
        assert_eq!(trim_connectors("sand bag"), "sand bag");
    }

    #[test]
    fn every_occurrence_is_counted_or_unresolved() {
        let line = "3 x monitors, 2 x gizmo; 1 x dock and 4 x A99 phones";
        let (_, found) = classify(line);
        assert_eq!(found.len(), 4);
        assert_eq!(
            found,
            vec![
                scalar(Item::Monitor, 3),
                unresolved("2 x gizmo"),
                scalar(Item::Dock, 1),
                counted(Category::Phones, "A35", 4),
            ]
        );
    }
}
