//! Aggregation layer: every view of the report panels is a pure function
//! from an [`context::AnalysisContext`] (or a record slice) to a typed
//! summary value.

pub mod care_mix;
pub mod classifier;
pub mod context;
pub mod crosstab;
pub mod production;
pub mod rankings;
pub mod summary;

pub use classifier::{CapacityTier, TeamCapacityStatus, classify_teams};
pub use context::{AnalysisContext, DateRange, GroupDimension};
pub use crosstab::Crosstab;
pub use rankings::RankedEntry;

use std::collections::HashMap;

/// Count occurrences per distinct value, descending by count. Ties keep
/// first-appearance order, so the donut and distribution views are
/// deterministic run to run.
pub fn value_counts<I>(values: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
