//! Binding aggregate values onto boundary features by region name.
//!
//! Each feature's trimmed name is tried against the district names of the
//! aggregate, first success wins:
//!
//! 1. exact match on the trimmed strings,
//! 2. match with all whitespace removed from both sides,
//! 3. the last whitespace-separated token of the feature name, exact or
//!    with whitespace removed from the district.
//!
//! Boundary files often label features `"<province> <district>"` while
//! tables carry the district alone, which is what rule 3 is for.
//!
//! Districts that share a name across provinces (`중구`, `동구`, ...) are
//! kept apart. A feature that hits several of them is resolved only if one
//! candidate's province appears in the feature name; otherwise it stays at
//! zero and is counted as ambiguous.

use crate::boundary::BoundaryCollection;
use crate::types::{AggregateEntry, FeatureMatch, MatchRule, MatchStats};
use crate::util::strip_whitespace;
use std::collections::HashMap;

/// Entries merged by trimmed `(province, district)`.
#[derive(Debug)]
struct Slot {
    province: String,
    district: String,
    total_value: f64,
}

enum Resolution {
    Matched(usize, MatchRule),
    Ambiguous,
    Unmatched,
}

/// Lookup from district name to aggregate value, built fresh for each pass.
#[derive(Debug)]
pub struct NameIndex {
    slots: Vec<Slot>,
    exact: HashMap<String, Vec<usize>>,
    stripped: HashMap<String, Vec<usize>>,
}

impl NameIndex {
    pub fn build(entries: &[AggregateEntry]) -> Self {
        let mut slots: Vec<Slot> = Vec::new();
        let mut by_key: HashMap<(String, String), usize> = HashMap::new();
        let mut exact: HashMap<String, Vec<usize>> = HashMap::new();
        let mut stripped: HashMap<String, Vec<usize>> = HashMap::new();

        for e in entries {
            let province = e.province.trim().to_string();
            let district = e.district.trim().to_string();
            match by_key.get(&(province.clone(), district.clone())) {
                Some(&i) => slots[i].total_value += e.total_value,
                None => {
                    let i = slots.len();
                    by_key.insert((province.clone(), district.clone()), i);
                    exact.entry(district.clone()).or_default().push(i);
                    stripped
                        .entry(strip_whitespace(&district))
                        .or_default()
                        .push(i);
                    slots.push(Slot {
                        province,
                        district,
                        total_value: e.total_value,
                    });
                }
            }
        }
        NameIndex {
            slots,
            exact,
            stripped,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn resolve(&self, name: &str) -> Resolution {
        if name.is_empty() {
            return Resolution::Unmatched;
        }
        if let Some(c) = self.exact.get(name) {
            return self.pick(c, name, MatchRule::Exact);
        }
        if let Some(c) = self.stripped.get(&strip_whitespace(name)) {
            return self.pick(c, name, MatchRule::WhitespaceInsensitive);
        }
        if name.contains(char::is_whitespace) {
            if let Some(last) = name.split_whitespace().last() {
                if let Some(c) = self.exact.get(last).or_else(|| self.stripped.get(last)) {
                    return self.pick(c, name, MatchRule::LastToken);
                }
            }
        }
        Resolution::Unmatched
    }

    fn pick(&self, candidates: &[usize], name: &str, rule: MatchRule) -> Resolution {
        if let [only] = candidates {
            return Resolution::Matched(*only, rule);
        }
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let compact = strip_whitespace(name);
        let hits: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| {
                let p = &self.slots[i].province;
                !p.is_empty()
                    && (tokens.contains(&p.as_str()) || compact.starts_with(&strip_whitespace(p)))
            })
            .collect();
        match hits.as_slice() {
            [one] => Resolution::Matched(*one, rule),
            _ => {
                log::debug!("`{name}` matches {} districts, leaving unbound", candidates.len());
                Resolution::Ambiguous
            }
        }
    }
}

/// Bind `entries` onto a copy of `collection`.
///
/// Every feature gets `_display_name` and `_value` (0 when unmatched); all
/// other properties and the geometry are left as they were. The inputs are
/// not touched.
pub fn bind(
    entries: &[AggregateEntry],
    collection: &BoundaryCollection,
    name_field: &str,
) -> (BoundaryCollection, MatchStats) {
    let mut out = collection.clone();
    let stats = bind_in_place(entries, &mut out, name_field);
    (out, stats)
}

/// Same as [`bind`] but annotates `collection` directly. Callers sharing a
/// collection must not run two passes over it at once.
pub fn bind_in_place(
    entries: &[AggregateEntry],
    collection: &mut BoundaryCollection,
    name_field: &str,
) -> MatchStats {
    let index = NameIndex::build(entries);
    let mut claimed = vec![false; index.len()];
    let mut stats = MatchStats {
        total_features: collection.len(),
        total_entries: entries.len(),
        ..MatchStats::default()
    };

    for feature in &mut collection.features {
        let display_name = feature.name_value(name_field);
        let (value, rule) = match index.resolve(&display_name) {
            Resolution::Matched(i, rule) => {
                claimed[i] = true;
                stats.matched_features += 1;
                (index.slots[i].total_value, Some(rule))
            }
            Resolution::Ambiguous => {
                stats.ambiguous_features += 1;
                (0.0, None)
            }
            Resolution::Unmatched => (0.0, None),
        };
        feature.annotate(&display_name, value);
        stats.features.push(FeatureMatch {
            display_name,
            resolved_value: value,
            rule,
        });
    }

    stats.unmatched_entries = index
        .slots
        .iter()
        .zip(&claimed)
        .filter(|(_, c)| !**c)
        .map(|(s, _)| format!("{} {}", s.province, s.district).trim().to_string())
        .collect();

    log::info!(
        "bound {} of {} features; {} entries unmatched",
        stats.matched_features,
        stats.total_features,
        stats.unmatched_entry_count()
    );
    stats
}
