use std::io;
use std::time::Instant;

use crate::compare::{compare, CompareSettings};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::extract::{extract, SourceDocument};
use crate::model::{CompareMode, ComparisonResult, ReportDataset, SourceKind};
use crate::verdict::{record_verdict, VerdictSink};

/// Extract the source and compare it against the machine-generated table.
///
/// `Auto` mode resolves to exact for workbooks and fuzzy for recognizer tables.
pub fn reconcile(
    source: &SourceDocument,
    output: &ReportDataset,
    mode: CompareMode,
    config: &ReconConfig,
) -> Result<ComparisonResult, ReconError> {
    let kind = match source {
        SourceDocument::Workbook(_) => SourceKind::Spreadsheet,
        SourceDocument::Table(_) => SourceKind::Table,
    };
    let extraction = extract(source, &config.extract)?;
    let mut result = compare(
        &extraction.dataset,
        output,
        mode.resolve(kind),
        &CompareSettings::from_config(config),
    )?;
    result.sheets = extraction.sheets;
    Ok(result)
}

/// Call boundary for one reconciliation attempt.
///
/// Runs `attempt`, turns any [`ReconError`] into a failure verdict, and appends
/// exactly one audit record. Only a failed audit write is returned as an error.
pub fn run_and_record<F>(
    file_name: &str,
    sink: &mut dyn VerdictSink,
    attempt: F,
) -> io::Result<ComparisonResult>
where
    F: FnOnce() -> Result<ComparisonResult, ReconError>,
{
    let start = Instant::now();

    let result = match attempt() {
        Ok(mut result) => {
            result.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            result
        }
        Err(e) => {
            log::warn!("{file_name}: {e}");
            ComparisonResult::failed(&e, start.elapsed().as_secs_f64() * 1000.0)
        }
    };

    let record = record_verdict(sink, file_name, Some(result.matched))?;
    log::info!("{file_name} | {}", record.verdict);

    Ok(result)
}
