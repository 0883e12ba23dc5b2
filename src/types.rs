use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as it comes off disk. Every column is optional text so a bad
/// cell never fails the whole row; `loader` does the cleaning.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "광역시도", alias = "province", default)]
    pub province: Option<String>,
    #[serde(rename = "기초지자체", alias = "district", default)]
    pub district: Option<String>,
    #[serde(rename = "배출연도", alias = "year", default)]
    pub period_year: Option<String>,
    #[serde(rename = "배출월", alias = "month", default)]
    pub period_month: Option<String>,
    #[serde(rename = "배출량(톤)", alias = "value", default)]
    pub value: Option<String>,
    #[serde(rename = "일자", alias = "date", default)]
    pub date: Option<String>,
}

/// A cleaned, immutable source record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub province: String,
    pub district: String,
    pub period_year: i32,
    pub period_month: Option<u32>,
    pub value: f64,
}

/// Sum of `value` for one `(province, district)` pair in the selected period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub province: String,
    pub district: String,
    pub total_value: f64,
}

/// Row of the top-N preview table.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TopRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Province")]
    pub province: String,
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Share")]
    pub share: String,
}

/// Which rule resolved a feature's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    WhitespaceInsensitive,
    LastToken,
}

/// Outcome of binding a single feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatch {
    pub display_name: String,
    pub resolved_value: f64,
    pub rule: Option<MatchRule>,
}

/// Reconciliation counts for one binding pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStats {
    pub total_features: usize,
    pub matched_features: usize,
    /// Features whose name hit several entries that could not be told apart.
    pub ambiguous_features: usize,
    pub total_entries: usize,
    /// `"<province> <district>"` of every entry that no feature claimed.
    pub unmatched_entries: Vec<String>,
    /// Per-feature outcome, in collection order.
    pub features: Vec<FeatureMatch>,
}

impl MatchStats {
    pub fn unmatched_features(&self) -> usize {
        self.total_features - self.matched_features
    }

    pub fn unmatched_entry_count(&self) -> usize {
        self.unmatched_entries.len()
    }

    /// Warning lines for the user, empty when everything reconciled.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.unmatched_features() > 0 {
            out.push(format!(
                "{} of {} regions had no data",
                self.unmatched_features(),
                self.total_features
            ));
        }
        if self.unmatched_entry_count() > 0 {
            out.push(format!(
                "{} data rows had no matching region",
                self.unmatched_entry_count()
            ));
        }
        if self.ambiguous_features > 0 {
            out.push(format!(
                "{} regions matched several districts with the same name",
                self.ambiguous_features
            ));
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub year: i32,
    pub month: Option<u32>,
    pub name_field: String,
    pub total_value: f64,
    pub total_entries: usize,
    pub total_features: usize,
    pub matched_features: usize,
    pub ambiguous_features: usize,
    pub unmatched_entries: Vec<String>,
}
