// Owned pipeline state: the loaded dataset and its filter set, replaced
// together on success and never touched on failure.
use crate::decode;
use crate::error::IngestError;
use crate::normalize;
use crate::schema::{self, ColumnMap};
use crate::stats;
use crate::types::{Dataset, PercentileReport, TypeFilterSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// What a successful ingestion did: data rows decoded (blank lines
/// excluded), records loaded, rows dropped by the completeness filter,
/// and the decoder's non-fatal warnings.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub total_rows: usize,
    pub loaded: usize,
    pub skipped_incomplete: usize,
    pub warnings: Vec<String>,
}

/// The single owner of the loaded [`Dataset`] and its [`TypeFilterSet`].
///
/// Ingestion either fully succeeds, replacing both halves together with
/// the filters reset to all-active over the new type list, or fully fails
/// with the previous state untouched. The pipeline itself is synchronous
/// and single-threaded; callers that can receive concurrent ingestion
/// triggers serialize them by wrapping the store in a `Mutex`, as the
/// bundled CLI does.
#[derive(Debug, Default)]
pub struct MetricsStore {
    dataset: Dataset,
    filters: TypeFilterSet,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a `.csv` file. The extension gate (ASCII case-insensitive)
    /// runs before any read, so a wrong file type never reaches the
    /// decoder.
    pub fn ingest_path(
        &mut self,
        path: impl AsRef<Path>,
        columns: &ColumnMap,
    ) -> Result<IngestSummary, IngestError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(IngestError::FileType {
                path: path.to_path_buf(),
                expected: ".csv",
            });
        }
        let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.ingest_text(&text, columns)
    }

    /// Run decode, validate and normalize over raw text, committing the
    /// new dataset and a reset filter set only after the whole pipeline
    /// has succeeded. Every error path returns before any mutation.
    pub fn ingest_text(
        &mut self,
        text: &str,
        columns: &ColumnMap,
    ) -> Result<IngestSummary, IngestError> {
        let table = decode::decode(text);
        let warnings = table.warnings.clone();
        let total_rows = table.rows.len();

        let valid = schema::validate(table, columns)?;
        let skipped_incomplete = valid.skipped;
        let dataset = normalize::normalize(&valid.rows, columns)?;

        let mut filters = TypeFilterSet::default();
        filters.reset(dataset.item_types());

        let loaded = dataset.len();
        // Atomic handover: both halves of the state change together.
        self.dataset = dataset;
        self.filters = filters;
        info!(loaded, skipped_incomplete, "dataset replaced");

        Ok(IngestSummary {
            total_rows,
            loaded,
            skipped_incomplete,
            warnings,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self) -> &TypeFilterSet {
        &self.filters
    }

    /// Flip one type's filter flag. Returns the new state, or `None` for
    /// a type not present in the current dataset.
    pub fn toggle_type(&mut self, item_type: &str) -> Option<bool> {
        self.filters.toggle(item_type)
    }

    pub fn set_type_active(&mut self, item_type: &str, active: bool) -> bool {
        self.filters.set_active(item_type, active)
    }

    /// Recompute the percentile report from the current state.
    pub fn report(&self) -> PercentileReport {
        stats::build_report(&self.dataset, &self.filters)
    }

    pub fn is_loaded(&self) -> bool {
        !self.dataset.is_empty()
    }
}
