use crate::types::{PercentileReport, TypeSummaryRow};
use crate::util::format_int;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Flatten a report into display rows, one per item type in first-seen
/// order. The Items column is the unfiltered badge; the lead-time columns
/// come from the filtered view and collapse to "-" for toggled-off types.
/// Means are rounded to whole days for display only.
pub fn summary_rows(report: &PercentileReport) -> Vec<TypeSummaryRow> {
    report
        .type_totals
        .iter()
        .map(|total| {
            let filtered = report
                .filtered_types
                .iter()
                .find(|f| f.item_type == total.item_type);
            match filtered {
                Some(f) => TypeSummaryRow {
                    item_type: total.item_type.clone(),
                    active: "yes".to_string(),
                    items: format_int(total.count as i64),
                    avg_lead_time: format_int(f.mean.round() as i64),
                    min: format_int(f.min),
                    max: format_int(f.max),
                },
                None => TypeSummaryRow {
                    item_type: total.item_type.clone(),
                    active: "no".to_string(),
                    items: format_int(total.count as i64),
                    avg_lead_time: "-".to_string(),
                    min: "-".to_string(),
                    max: "-".to_string(),
                },
            }
        })
        .collect()
}

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
