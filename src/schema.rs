// Required-column configuration and structural validation.
use crate::decode::RawTable;
use crate::error::IngestError;
use crate::types::RawRow;
use serde::Deserialize;
use tracing::debug;

/// Header names carrying the four semantic roles: identifier, item type,
/// commitment date, closed date. Display names are configurable (a config
/// file can override any subset); the roles are fixed, never inferred.
/// Matching against the file header is exact on trimmed names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub id: String,
    pub item_type: String,
    pub committed: String,
    pub closed: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            id: "ID".to_string(),
            item_type: "Type".to_string(),
            committed: "Committed Date".to_string(),
            closed: "Closed Date".to_string(),
        }
    }
}

impl ColumnMap {
    /// The four required header names, in role order.
    pub fn required(&self) -> [&str; 4] {
        [&self.id, &self.item_type, &self.committed, &self.closed]
    }
}

/// Rows that passed the completeness filter, plus how many were dropped.
#[derive(Debug)]
pub struct ValidRows {
    pub rows: Vec<RawRow>,
    pub skipped: usize,
}

/// Check the header for the four required columns, then keep only rows
/// whose required fields are all non-empty after trimming.
///
/// Missing columns fail with every absent name listed and both header
/// lists echoed. Incomplete rows are dropped and counted, never fatal;
/// zero survivors is its own failure, distinct from a bad header.
pub fn validate(table: RawTable, columns: &ColumnMap) -> Result<ValidRows, IngestError> {
    let missing: Vec<String> = columns
        .required()
        .iter()
        .filter(|c| !table.headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::Schema {
            missing,
            expected: columns.required().iter().map(|c| c.to_string()).collect(),
            found: table.headers,
        });
    }

    let total = table.rows.len();
    let rows: Vec<RawRow> = table
        .rows
        .into_iter()
        .filter(|row| row_is_complete(row, columns))
        .collect();
    let skipped = total - rows.len();
    if skipped > 0 {
        debug!("{skipped} row(s) skipped for incompleteness");
    }
    if rows.is_empty() {
        return Err(IngestError::NoValidData { skipped });
    }
    Ok(ValidRows { rows, skipped })
}

fn row_is_complete(row: &RawRow, columns: &ColumnMap) -> bool {
    columns
        .required()
        .iter()
        .all(|field| row.text(field).is_some_and(|v| !v.trim().is_empty()))
}
