//! `pnlcheck-recon`: cross-source reconciliation engine for Daily Hedging P&L reports.
//!
//! Pure engine crate: receives pre-loaded workbooks and tables, returns a
//! comparison result, and writes verdicts only through an injected
//! [`VerdictSink`]. No CLI or file dependencies.

pub mod canonical;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod grid;
pub mod model;
pub mod verdict;

pub use compare::{compare, select_branch, CompareSettings};
pub use config::ReconConfig;
pub use engine::{reconcile, run_and_record};
pub use error::{ErrorCategory, ReconError};
pub use extract::{extract, locate_columns, ColumnIndices, SourceDocument};
pub use grid::{Cell, Grid, Workbook};
pub use model::{Branch, CompareMode, ComparisonResult, ReportDataset, ReportRow, SourceKind};
pub use verdict::{AuditRecord, MemorySink, Verdict, VerdictSink};
