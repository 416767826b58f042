use serde::Serialize;

use crate::error::{ErrorCategory, ReconError};
use crate::extract::SheetStats;

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// One reporting line: the liability-side reference value and the asset value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportRow {
    pub reference: f64,
    pub asset: f64,
}

impl ReportRow {
    pub fn new(reference: f64, asset: f64) -> Self {
        Self { reference, asset }
    }
}

/// Rows in source order. `name` identifies the dataset in error messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDataset {
    pub name: String,
    pub rows: Vec<ReportRow>,
}

impl ReportDataset {
    pub fn new(name: impl Into<String>, rows: Vec<ReportRow>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn from_pairs(name: impl Into<String>, pairs: &[(f64, f64)]) -> Self {
        Self::new(name, pairs.iter().map(|&(r, a)| ReportRow::new(r, a)).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reject NaN and infinities; they have no canonical form.
    pub fn ensure_finite(&self) -> Result<(), ReconError> {
        match self
            .rows
            .iter()
            .position(|r| !r.reference.is_finite() || !r.asset.is_finite())
        {
            Some(row) => Err(ReconError::NonFiniteValue { table: self.name.clone(), row }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Source kinds + comparison modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Workbook with labelled sheets (xlsx, xls, xlsb, ods).
    Spreadsheet,
    /// Table already extracted by an external layout recognizer (CSV).
    Table,
    Unknown,
}

impl SourceKind {
    pub fn from_path(path: &std::path::Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => Self::Spreadsheet,
            Some("csv") => Self::Table,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::Table => write!(f, "table"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Exact for spreadsheets, fuzzy for recognizer tables.
    #[default]
    Auto,
    Exact,
    Fuzzy,
}

impl CompareMode {
    /// Resolve `Auto` against the kind of the source document.
    pub fn resolve(self, kind: SourceKind) -> Self {
        match (self, kind) {
            (Self::Auto, SourceKind::Table) => Self::Fuzzy,
            (Self::Auto, _) => Self::Exact,
            (mode, _) => mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison result
// ---------------------------------------------------------------------------

/// Which arm of the decision procedure produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Digest equality, requested directly.
    Exact,
    /// Positional tolerance matching against the pass threshold.
    FuzzyThreshold,
    /// Fuzzy requested, but row counts differ by more than the guard.
    FuzzyRowCountFallback,
    /// Fuzzy requested, but there are no overlapping rows.
    FuzzyEmptyFallback,
}

impl Branch {
    pub fn uses_digest(self) -> bool {
        !matches!(self, Self::FuzzyThreshold)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::FuzzyThreshold => write!(f, "fuzzy"),
            Self::FuzzyRowCountFallback => write!(f, "exact (row-count fallback)"),
            Self::FuzzyEmptyFallback => write!(f, "exact (empty fallback)"),
        }
    }
}

/// A positional row that fell outside tolerance in fuzzy mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMismatch {
    pub index: usize,
    pub source: ReportRow,
    pub output: ReportRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyStats {
    pub compared_rows: usize,
    pub matching_rows: usize,
    pub match_percentage: f64,
    pub mismatches: Vec<RowMismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&ReconError> for ErrorInfo {
    fn from(e: &ReconError) -> Self {
        Self { category: e.category(), message: e.to_string() }
    }
}

/// Outcome of one reconciliation attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    pub rows_source: usize,
    pub rows_output: usize,
    /// Per-sheet extraction counts; empty for table sources.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sheets: Vec<SheetStats>,
    pub canonical_digest_a: Option<String>,
    pub canonical_digest_b: Option<String>,
    pub canonical_string_a: Option<String>,
    pub canonical_string_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<FuzzyStats>,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ComparisonResult {
    /// Failure verdict for an attempt that could not be compared.
    pub fn failed(error: &ReconError, elapsed_ms: f64) -> Self {
        Self {
            matched: false,
            branch: None,
            rows_source: 0,
            rows_output: 0,
            sheets: Vec::new(),
            canonical_digest_a: None,
            canonical_digest_b: None,
            canonical_string_a: None,
            canonical_string_b: None,
            fuzzy: None,
            elapsed_ms,
            error: Some(ErrorInfo::from(error)),
        }
    }

    pub fn verdict(&self) -> crate::verdict::Verdict {
        crate::verdict::Verdict::from_match(Some(self.matched))
    }
}
