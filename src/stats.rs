// Grouping and distributional statistics over the loaded dataset.
//
// Everything here is a pure function of (Dataset, TypeFilterSet): no side
// effects, safe to recompute on every filter toggle.
use crate::types::{Dataset, PercentileReport, TypeFilterSet, TypeSummary, WorkItemRecord};
use crate::util::mean;
use std::collections::HashMap;

/// Rank-indexed percentile over lead-time samples: sort ascending, take
/// the element at `floor(n * p)`. An empty population yields 0 by
/// definition rather than erroring.
///
/// This is deliberately not an interpolated percentile. The direct rank
/// index can sit one element off the textbook definition; it is the
/// published contract of this engine and the tests pin it.
pub fn percentile(samples: &[i64], p: f64) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let idx = ((sorted.len() as f64) * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Build the report for the current dataset and filter set.
///
/// A record participates in the percentile population iff its type is
/// active. `type_totals` ignores the filter entirely (those are the
/// always-visible badges); `filtered_types` summarizes only active types
/// over the filtered records. Both keep the dataset's first-seen order.
pub fn build_report(dataset: &Dataset, filters: &TypeFilterSet) -> PercentileReport {
    let filtered: Vec<&WorkItemRecord> = dataset
        .records()
        .iter()
        .filter(|r| filters.is_active(&r.item_type))
        .collect();
    let lead_times: Vec<i64> = filtered.iter().map(|r| r.lead_time_days).collect();

    let type_totals = summarize(dataset.item_types(), dataset.records().iter());
    let active_types: Vec<String> = dataset
        .item_types()
        .iter()
        .filter(|t| filters.is_active(t))
        .cloned()
        .collect();
    let filtered_types = summarize(&active_types, filtered.iter().copied());

    PercentileReport {
        p85: percentile(&lead_times, 0.85),
        p95: percentile(&lead_times, 0.95),
        filtered_count: filtered.len(),
        type_totals,
        filtered_types,
    }
}

// Per-type count/mean/min/max, in exactly the order `types` lists them.
fn summarize<'a>(
    types: &[String],
    records: impl Iterator<Item = &'a WorkItemRecord>,
) -> Vec<TypeSummary> {
    let mut buckets: HashMap<&str, Vec<i64>> =
        types.iter().map(|t| (t.as_str(), Vec::new())).collect();
    for r in records {
        if let Some(bucket) = buckets.get_mut(r.item_type.as_str()) {
            bucket.push(r.lead_time_days);
        }
    }
    types
        .iter()
        .map(|t| {
            let days = &buckets[t.as_str()];
            TypeSummary {
                item_type: t.clone(),
                count: days.len(),
                mean: mean(days),
                min: days.iter().copied().min().unwrap_or(0),
                max: days.iter().copied().max().unwrap_or(0),
            }
        })
        .collect()
}
