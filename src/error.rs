use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Failure surface of one ingestion run.
///
/// Every variant is fatal for the whole run: the store commits nothing on
/// any of these, so a previously loaded dataset stays untouched. Row-level
/// incompleteness is not represented here; such rows are dropped and
/// counted in `IngestSummary` instead. Each variant carries enough
/// structure for a caller to render an actionable message without
/// re-deriving context.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The path does not look like a CSV file. Checked before any read.
    #[error("{path} is not a CSV file (expected a {expected} extension)")]
    FileType {
        path: PathBuf,
        expected: &'static str,
    },

    /// The file could not be read at all.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more required columns are absent from the header row.
    ///
    /// `expected` and `found` echo both header lists verbatim so the
    /// caller can show them side by side.
    #[error(
        "missing required column(s) [{}]: expected header [{}], found [{}]",
        missing.join(", "),
        expected.join(", "),
        found.join(", ")
    )]
    Schema {
        missing: Vec<String>,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The header was valid but no row survived the completeness filter.
    #[error("no usable rows: all {skipped} data row(s) were missing required fields")]
    NoValidData { skipped: usize },

    /// A surviving row failed semantic validation.
    #[error("work item {id}: {fault}")]
    Data { id: String, fault: DataFault },
}

/// What exactly was wrong with the offending row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataFault {
    #[error("{field} value {value:?} is not a recognizable calendar date (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("closed date {closed} is earlier than committed date {committed}")]
    ClosedBeforeCommitted {
        committed: NaiveDate,
        closed: NaiveDate,
    },
}
