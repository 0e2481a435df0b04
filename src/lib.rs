//! Lead-time analytics for exported work-item CSVs.
//!
//! The pipeline runs in fixed stages: [`decode`] sniffs the delimiter and
//! produces loosely-typed rows, [`schema`] checks required headers and
//! drops incomplete rows, [`normalize`] parses dates and derives inclusive
//! lead times, and [`stats`] computes rank-indexed percentiles over the
//! type-filtered population. [`store::MetricsStore`] owns the loaded state
//! and replaces it only when a whole ingestion run has succeeded.

pub mod decode;
pub mod error;
pub mod normalize;
pub mod render;
pub mod schema;
pub mod stats;
pub mod store;
pub mod types;
pub mod util;

pub use error::{DataFault, IngestError};
pub use schema::ColumnMap;
pub use store::{IngestSummary, MetricsStore};
pub use types::{Dataset, PercentileReport, TypeFilterSet, TypeSummary, WorkItemRecord};
