// Row-to-record conversion: trims identity fields, parses both dates,
// enforces date ordering, derives the lead-time metric.
use crate::error::{DataFault, IngestError};
use crate::schema::ColumnMap;
use crate::types::{Dataset, RawRow, WorkItemRecord};
use crate::util::{lead_time_days, parse_calendar_date};

/// Convert surviving rows into typed records, failing the entire run on
/// the first bad row. Incompleteness was already filtered upstream, so
/// anything wrong here is data worth stopping for. The result is the
/// fully sorted [`Dataset`].
pub fn normalize(rows: &[RawRow], columns: &ColumnMap) -> Result<Dataset, IngestError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(normalize_row(row, columns)?);
    }
    Ok(Dataset::from_records(records))
}

fn normalize_row(row: &RawRow, columns: &ColumnMap) -> Result<WorkItemRecord, IngestError> {
    let id = row.text(&columns.id).unwrap_or_default().trim().to_string();
    let item_type = row
        .text(&columns.item_type)
        .unwrap_or_default()
        .trim()
        .to_string();

    let committed_raw = row.text(&columns.committed).unwrap_or_default();
    let committed_at = parse_calendar_date(&committed_raw).ok_or_else(|| IngestError::Data {
        id: id.clone(),
        fault: DataFault::InvalidDate {
            field: columns.committed.clone(),
            value: committed_raw.trim().to_string(),
        },
    })?;

    let closed_raw = row.text(&columns.closed).unwrap_or_default();
    let closed_at = parse_calendar_date(&closed_raw).ok_or_else(|| IngestError::Data {
        id: id.clone(),
        fault: DataFault::InvalidDate {
            field: columns.closed.clone(),
            value: closed_raw.trim().to_string(),
        },
    })?;

    if closed_at < committed_at {
        return Err(IngestError::Data {
            id,
            fault: DataFault::ClosedBeforeCommitted {
                committed: committed_at,
                closed: closed_at,
            },
        });
    }

    // Dates are already truncated to day granularity, so the inclusive
    // count is exact whatever time-of-day the input strings carried.
    let lead = lead_time_days(committed_at, closed_at);
    Ok(WorkItemRecord {
        id,
        item_type,
        committed_at,
        closed_at,
        lead_time_days: lead,
    })
}
