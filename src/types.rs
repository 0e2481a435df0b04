use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tabled::Tabled;

/// One decoded data row: header name to loosely-typed cell value, plus the
/// 1-based line it came from (for diagnostics). Cells are strings except
/// where the decoder coerced a losslessly numeric-looking value; consumers
/// that need exact text re-read through [`RawRow::text`].
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: u64,
    pub cells: HashMap<String, Value>,
}

impl RawRow {
    /// The cell under `field`, rendered back to text. Numbers round-trip
    /// losslessly by construction, so this never invents digits.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.cells.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A validated work item. Immutable once built; `lead_time_days` is always
/// the inclusive day count derived from the two dates, never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItemRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    #[serde(rename = "Committed Date")]
    pub committed_at: NaiveDate,
    #[serde(rename = "Closed Date")]
    pub closed_at: NaiveDate,
    #[serde(rename = "Lead Time Days")]
    pub lead_time_days: i64,
}

/// The full loaded population, sorted ascending by closed date (stable, so
/// input order breaks ties), with the distinct item types in first-seen
/// order over that sorted sequence. Only [`Dataset::from_records`] builds
/// one, which keeps both invariants true for every consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<WorkItemRecord>,
    item_types: Vec<String>,
}

impl Dataset {
    pub fn from_records(mut records: Vec<WorkItemRecord>) -> Self {
        records.sort_by_key(|r| r.closed_at);
        let mut item_types: Vec<String> = Vec::new();
        for r in &records {
            if !item_types.iter().any(|t| t == &r.item_type) {
                item_types.push(r.item_type.clone());
            }
        }
        Dataset {
            records,
            item_types,
        }
    }

    pub fn records(&self) -> &[WorkItemRecord] {
        &self.records
    }

    pub fn item_types(&self) -> &[String] {
        &self.item_types
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-type visibility flags. A type absent from the map counts as
/// inactive; after every successful ingestion the set is reset so each
/// type present in the dataset has an entry, defaulting to active.
#[derive(Debug, Clone, Default)]
pub struct TypeFilterSet {
    active: HashMap<String, bool>,
}

impl TypeFilterSet {
    /// Rebuild the set for a new dataset: every listed type active, stale
    /// keys from a previous dataset dropped.
    pub fn reset(&mut self, types: &[String]) {
        self.active = types.iter().map(|t| (t.clone(), true)).collect();
    }

    /// Flip one type. Returns the new state, or `None` if the type is not
    /// part of the current dataset.
    pub fn toggle(&mut self, item_type: &str) -> Option<bool> {
        let flag = self.active.get_mut(item_type)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn set_active(&mut self, item_type: &str, active: bool) -> bool {
        match self.active.get_mut(item_type) {
            Some(flag) => {
                *flag = active;
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, item_type: &str) -> bool {
        self.active.get(item_type).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Count/mean/min/max of lead time for one item type. `mean` stays at full
/// precision here; display rounding is the render layer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub item_type: String,
    pub count: usize,
    pub mean: f64,
    pub min: i64,
    pub max: i64,
}

/// Derived statistics over (Dataset, TypeFilterSet). Recomputed on demand,
/// never stored or mutated in place.
///
/// `type_totals` covers each type's whole membership regardless of filter
/// state (the always-visible count badges); `filtered_types` covers only
/// active types over the filtered population (the lead-time-average view).
/// Both lists keep the dataset's first-seen type order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileReport {
    pub p85: i64,
    pub p95: i64,
    pub filtered_count: usize,
    pub type_totals: Vec<TypeSummary>,
    pub filtered_types: Vec<TypeSummary>,
}

/// Display row for the per-type table: total badge alongside the filtered
/// lead-time columns ("-" when the type is toggled off).
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TypeSummaryRow {
    #[serde(rename = "Type")]
    #[tabled(rename = "Type")]
    pub item_type: String,
    #[serde(rename = "Active")]
    #[tabled(rename = "Active")]
    pub active: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: String,
    #[serde(rename = "AvgLeadTime")]
    #[tabled(rename = "AvgLeadTime")]
    pub avg_lead_time: String,
    #[serde(rename = "Min")]
    #[tabled(rename = "Min")]
    pub min: String,
    #[serde(rename = "Max")]
    #[tabled(rename = "Max")]
    pub max: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, item_type: &str, closed_day: u32) -> WorkItemRecord {
        WorkItemRecord {
            id: id.to_string(),
            item_type: item_type.to_string(),
            committed_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            closed_at: NaiveDate::from_ymd_opt(2025, 1, closed_day).unwrap(),
            lead_time_days: closed_day as i64,
        }
    }

    #[test]
    fn dataset_sorts_by_closed_date_and_keeps_first_seen_type_order() {
        let ds = Dataset::from_records(vec![
            rec("C", "Bug", 9),
            rec("A", "Story", 2),
            rec("B", "Bug", 5),
        ]);
        let ids: Vec<&str> = ds.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(ds.item_types(), ["Story", "Bug"]);
    }

    #[test]
    fn dataset_sort_is_stable_on_closed_date_ties() {
        let ds = Dataset::from_records(vec![
            rec("first", "Bug", 5),
            rec("second", "Bug", 5),
            rec("third", "Bug", 5),
        ]);
        let ids: Vec<&str> = ds.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn filter_set_resets_drops_stale_types_and_defaults_active() {
        let mut filters = TypeFilterSet::default();
        filters.reset(&["Bug".to_string(), "Story".to_string()]);
        assert!(filters.is_active("Bug"));
        assert!(filters.is_active("Story"));
        assert_eq!(filters.toggle("Bug"), Some(false));
        assert!(!filters.is_active("Bug"));

        filters.reset(&["Task".to_string()]);
        assert_eq!(filters.len(), 1);
        assert!(filters.is_active("Task"));
        // Stale key is gone, and absent means inactive.
        assert!(!filters.is_active("Bug"));
        assert_eq!(filters.toggle("Bug"), None);
    }

    #[test]
    fn raw_row_renders_numbers_back_to_text() {
        let mut cells = HashMap::new();
        cells.insert("a".to_string(), Value::String("x".to_string()));
        cells.insert("n".to_string(), Value::Number(42.into()));
        let row = RawRow { line: 2, cells };
        assert_eq!(row.text("a").as_deref(), Some("x"));
        assert_eq!(row.text("n").as_deref(), Some("42"));
        assert_eq!(row.text("missing"), None);
    }
}
