//! `taxmatch-recon` — key-based reconciliation of two fiscal tables.
//!
//! Pure engine crate: receives loaded tables, returns partitions, views and
//! a summary. No CLI or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod join;
pub mod model;
pub mod normalize;
pub mod report;
pub mod session;

pub use config::{ReconConfig, Side};
pub use engine::run;
pub use error::ReconError;
pub use filter::{filter_by_code, FilterChoice};
pub use model::{Partition, PartitionKind, Provenance, ReconResult, ReconSummary, Table, TableView, Value};
pub use normalize::{dedup_column_names, normalize_table};
pub use report::{build_report, export_sheets, ExportSheet, Report, XLSX_MIME};
pub use session::{AppliedFilter, ReconOutput, ReconSession, SessionOutcome};
