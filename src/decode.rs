// CSV decoding: delimiter detection and tolerant row extraction.
//
// Decoding is a pure transform and never fails: malformed input degrades
// to per-row warnings, and everything semantic (required columns, dates)
// is someone else's job.
use crate::types::RawRow;
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

// Candidate delimiters, in tie-break order.
const DELIMITERS: &[u8] = &[b',', b'\t', b'|', b';'];

/// Decoder output: the trimmed header names in file order, the data rows,
/// and any non-fatal diagnostics collected along the way.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub delimiter: u8,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub warnings: Vec<String>,
}

/// Decode delimited text into loosely-typed rows keyed by header name.
///
/// The delimiter is sniffed from the header line among comma, tab, pipe
/// and semicolon. Fully blank lines are skipped. Ragged rows are kept
/// (missing cells simply absent, extra cells dropped) and reported as
/// warnings rather than errors.
pub fn decode(text: &str) -> RawTable {
    let delimiter = detect_delimiter(text);
    let mut warnings: Vec<String> = Vec::new();

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(|s| s.trim().to_string()).collect(),
        Err(e) => {
            let msg = format!("unreadable header row: {e}");
            warn!("{msg}");
            warnings.push(msg);
            Vec::new()
        }
    };

    let mut rows: Vec<RawRow> = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let msg = format!("unreadable row: {e}");
                warn!("{msg}");
                warnings.push(msg);
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // A blank line decodes as a single empty field; drop it silently.
        // Rows of empty cells (",,,") are NOT dropped here; the
        // completeness filter counts those.
        if record.is_empty() || (record.len() == 1 && record[0].trim().is_empty()) {
            continue;
        }

        if record.len() != headers.len() {
            let msg = format!(
                "line {line}: expected {} field(s), found {}",
                headers.len(),
                record.len()
            );
            warn!("{msg}");
            warnings.push(msg);
        }

        let cells: HashMap<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), coerce_cell(cell)))
            .collect();
        rows.push(RawRow { line, cells });
    }

    RawTable {
        delimiter,
        headers,
        rows,
        warnings,
    }
}

/// Pick the delimiter by counting candidates in the first non-blank line.
/// Highest count wins; ties resolve in `DELIMITERS` order; a line with
/// none of them falls back to comma (the schema validator then produces
/// the actionable error).
fn detect_delimiter(text: &str) -> u8 {
    let Some(header) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };
    let mut best = b',';
    let mut best_count = 0usize;
    for &cand in DELIMITERS {
        let count = header.bytes().filter(|&b| b == cand).count();
        if count > best_count {
            best = cand;
            best_count = count;
        }
    }
    best
}

// Opportunistic typing: only values that survive an exact i64 round-trip
// become numbers, so identifiers like "007" keep their text form.
fn coerce_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        if n.to_string() == trimmed {
            return Value::Number(n.into());
        }
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_supported_delimiter() {
        assert_eq!(detect_delimiter("ID,Type,Committed Date,Closed Date"), b',');
        assert_eq!(
            detect_delimiter("ID\tType\tCommitted Date\tClosed Date"),
            b'\t'
        );
        assert_eq!(detect_delimiter("ID|Type|Committed Date|Closed Date"), b'|');
        assert_eq!(detect_delimiter("ID;Type;Committed Date;Closed Date"), b';');
    }

    #[test]
    fn delimiter_falls_back_to_comma() {
        assert_eq!(detect_delimiter("justoneheader"), b',');
        assert_eq!(detect_delimiter(""), b',');
        assert_eq!(detect_delimiter("\n\n"), b',');
    }

    #[test]
    fn decodes_rows_keyed_by_header() {
        let table = decode("ID,Type\nW-1,Bug\nW-2,Story\n");
        assert_eq!(table.headers, ["ID", "Type"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].text("ID").as_deref(), Some("W-1"));
        assert_eq!(table.rows[1].text("Type").as_deref(), Some("Story"));
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn pipe_delimited_input_decodes_the_same_way() {
        let table = decode("ID|Type\nW-1|Bug\n");
        assert_eq!(table.delimiter, b'|');
        assert_eq!(table.rows[0].text("Type").as_deref(), Some("Bug"));
    }

    #[test]
    fn skips_fully_blank_lines() {
        let table = decode("ID,Type\n\nW-1,Bug\n   \nW-2,Story\n\n");
        assert_eq!(table.rows.len(), 2);
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn keeps_rows_of_empty_cells_for_the_completeness_filter() {
        let table = decode("ID,Type\n,\nW-1,Bug\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].text("ID").as_deref(), Some(""));
    }

    #[test]
    fn ragged_rows_warn_but_still_decode() {
        let table = decode("ID,Type,Closed Date\nW-1,Bug\nW-2,Story,2025-01-02,extra\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.warnings.len(), 2);
        assert!(table.warnings[0].contains("expected 3 field(s), found 2"));
        // Short row: the missing cell is simply absent.
        assert_eq!(table.rows[0].text("Closed Date"), None);
        // Long row: the extra cell is dropped.
        assert_eq!(table.rows[1].text("Closed Date").as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn numeric_coercion_is_lossless_only() {
        let table = decode("ID,Type\n007,Bug\n42,Story\n");
        assert_eq!(table.rows[0].cells["ID"], Value::String("007".to_string()));
        assert_eq!(table.rows[0].text("ID").as_deref(), Some("007"));
        assert_eq!(table.rows[1].cells["ID"], Value::Number(42.into()));
        assert_eq!(table.rows[1].text("ID").as_deref(), Some("42"));
    }

    #[test]
    fn quoted_cells_may_contain_the_delimiter_and_newlines() {
        let table = decode("ID,Type\n\"W-1\",\"Bug, severe\n follow-up\"\n");
        assert_eq!(table.rows.len(), 1);
        let cell = table.rows[0].text("Type").unwrap();
        assert!(cell.contains("Bug, severe"));
        assert!(cell.contains("follow-up"));
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        let table = decode("");
        assert!(table.rows.is_empty());
        // Whatever the reader reports for the missing header row, no
        // usable column name comes out of it.
        assert!(table.headers.iter().all(|h| h.is_empty()));
    }
}
