//! Per-session state: the record table and the boundary collection, loaded
//! once and then only read. Each binding pass borrows from here.

use crate::aggregate::{aggregate, grand_total};
use crate::binder::bind;
use crate::boundary::BoundaryCollection;
use crate::detect::{detect_name_field, require_name_field, validate_name_field};
use crate::error::Result;
use crate::types::{AggregateEntry, MatchStats, Record, RunSummary};

/// Everything one binding pass produces.
#[derive(Debug)]
pub struct ChoroplethPass {
    pub year: i32,
    pub month: Option<u32>,
    pub entries: Vec<AggregateEntry>,
    pub total_value: f64,
    pub annotated: BoundaryCollection,
    pub stats: MatchStats,
}

impl ChoroplethPass {
    pub fn summary(&self, name_field: &str) -> RunSummary {
        RunSummary {
            year: self.year,
            month: self.month,
            name_field: name_field.to_string(),
            total_value: self.total_value,
            total_entries: self.stats.total_entries,
            total_features: self.stats.total_features,
            matched_features: self.stats.matched_features,
            ambiguous_features: self.stats.ambiguous_features,
            unmatched_entries: self.stats.unmatched_entries.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub records: Vec<Record>,
    pub boundaries: BoundaryCollection,
    pub name_field: String,
}

impl Session {
    /// Settle the name field once: the override if given (it must exist on
    /// some feature), else auto-detection. Then check it across `sample`
    /// features.
    ///
    /// # Errors
    ///
    /// Any name-field error from [`crate::detect`]; all are fatal for the
    /// session.
    pub fn new(
        records: Vec<Record>,
        boundaries: BoundaryCollection,
        name_field_override: Option<&str>,
        sample: usize,
        strict: bool,
    ) -> Result<Self> {
        let name_field = match name_field_override {
            Some(f) => require_name_field(&boundaries, f)?,
            None => detect_name_field(&boundaries)?,
        };
        validate_name_field(&boundaries, &name_field, sample, strict)?;
        log::info!("using name field `{name_field}`");
        Ok(Session {
            records,
            boundaries,
            name_field,
        })
    }

    /// Aggregate the selected period and bind it onto a fresh copy of the
    /// boundaries.
    pub fn run(&self, year: i32, month: Option<u32>) -> ChoroplethPass {
        let entries = aggregate(&self.records, year, month);
        let total_value = grand_total(&entries);
        let (annotated, stats) = bind(&entries, &self.boundaries, &self.name_field);
        for w in stats.warnings() {
            log::warn!("{w}");
        }
        ChoroplethPass {
            year,
            month,
            entries,
            total_value,
            annotated,
            stats,
        }
    }
}
