use serde::Serialize;
use std::collections::HashMap;

/// One labeled measure, as produced by grouping and consumed by ranking
/// views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
}

/// Sum a measure per label, preserving first-appearance order of labels.
pub fn sum_by<I>(pairs: I) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<RankedEntry> = Vec::new();
    for (label, value) in pairs {
        match index.get(&label) {
            Some(&i) => entries[i].value += value,
            None => {
                index.insert(label.clone(), entries.len());
                entries.push(RankedEntry { label, value });
            }
        }
    }
    entries
}

/// Top `n` entries by value, descending. The sort is stable: tied values
/// keep their original relative order.
pub fn top_n(mut entries: Vec<RankedEntry>, n: usize) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(n);
    entries
}

/// Ratio with the zero-denominator rule every report computation follows:
/// an empty denominator yields 0, never a fault or an undefined value.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage with the same zero-denominator rule.
pub fn safe_pct(part: f64, whole: f64) -> f64 {
    safe_ratio(part, whole) * 100.0
}
