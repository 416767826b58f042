// One-file validation: load both inputs, reconcile, record the verdict

use std::io;
use std::path::{Path, PathBuf};

use pnlcheck_recon::config::ReconConfig;
use pnlcheck_recon::engine::{reconcile, run_and_record};
use pnlcheck_recon::extract::SourceDocument;
use pnlcheck_recon::model::{CompareMode, ComparisonResult, SourceKind};
use pnlcheck_recon::verdict::VerdictSink;
use pnlcheck_recon::ReconError;

use crate::csv::{load_table, TableColumns};
use crate::xlsx;

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// Human-authored source: workbook or pre-extracted table.
    pub source: PathBuf,
    /// Machine-generated table to check against the source.
    pub output: PathBuf,
    /// Source kind; inferred from the extension when `None`.
    pub kind: Option<SourceKind>,
    pub mode: CompareMode,
    /// Name written to the audit log; defaults to the source file name.
    pub name: Option<String>,
}

impl ValidationRequest {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            kind: None,
            mode: CompareMode::Auto,
            name: None,
        }
    }

    pub fn audit_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.source.display().to_string())
        })
    }

    pub fn source_kind(&self) -> SourceKind {
        self.kind.unwrap_or_else(|| SourceKind::from_path(&self.source))
    }
}

/// Load a source document of the given kind.
pub fn load_source(
    path: &Path,
    kind: SourceKind,
    config: &ReconConfig,
) -> Result<SourceDocument, ReconError> {
    match kind {
        SourceKind::Spreadsheet => Ok(SourceDocument::Workbook(xlsx::import_only(
            path,
            &config.extract.sheets,
        )?)),
        SourceKind::Table => {
            let columns = TableColumns {
                reference: &config.tables.source_reference_column,
                asset: &config.tables.source_asset_column,
            };
            Ok(SourceDocument::Table(load_table(path, "source", columns)?))
        }
        SourceKind::Unknown => Err(ReconError::UnsupportedSource(format!(
            "cannot determine source kind of {}",
            path.display()
        ))),
    }
}

/// Validate one source file against its machine-generated table.
///
/// Every failure to load, extract or compare becomes a "wrong" verdict in the
/// returned result. Exactly one audit record is appended; only a failure to
/// append it is returned as an error.
pub fn validate_file(
    request: &ValidationRequest,
    config: &ReconConfig,
    sink: &mut dyn VerdictSink,
) -> io::Result<ComparisonResult> {
    let name = request.audit_name();
    run_and_record(&name, sink, || {
        let kind = request.source_kind();
        let source = load_source(&request.source, kind, config)?;
        let output_columns = TableColumns {
            reference: &config.tables.output_reference_column,
            asset: &config.tables.output_asset_column,
        };
        let output = load_table(&request.output, "output", output_columns)?;
        reconcile(&source, &output, request.mode, config)
    })
}
