//! Source Extractor: turns a labelled workbook into a two-column dataset.
//!
//! Column discovery is label driven. Each configured sheet is scanned for the
//! reference and asset header cells, data starts at the first row below them
//! where both columns hold numbers, and every later row is kept unless it is
//! blank, non-numeric, or a "Total" line.

use serde::Serialize;

use crate::canonical::normalize;
use crate::config::ExtractConfig;
use crate::error::ReconError;
use crate::grid::{Cell, Grid, Workbook};
use crate::model::{ReportDataset, ReportRow};

/// A source document ready for extraction.
#[derive(Debug, Clone)]
pub enum SourceDocument {
    Workbook(Workbook),
    /// Pre-extracted by an external recognizer; used as-is.
    Table(ReportDataset),
}

/// Where the two data columns live in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnIndices {
    /// Row holding the later of the two headers.
    pub header_row: usize,
    pub reference: usize,
    pub asset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub sheet: String,
    pub data_start: usize,
    pub kept: usize,
    pub skipped_totals: usize,
    pub skipped_blank: usize,
    pub skipped_non_numeric: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub dataset: ReportDataset,
    pub sheets: Vec<SheetStats>,
}

/// Extract a dataset from any source document.
pub fn extract(doc: &SourceDocument, config: &ExtractConfig) -> Result<Extraction, ReconError> {
    match doc {
        SourceDocument::Workbook(wb) => extract_workbook(wb, config),
        SourceDocument::Table(table) => Ok(Extraction {
            dataset: table.clone(),
            sheets: Vec::new(),
        }),
    }
}

/// Process configured sheets in order and concatenate their rows.
pub fn extract_workbook(wb: &Workbook, config: &ExtractConfig) -> Result<Extraction, ReconError> {
    let mut rows = Vec::new();
    let mut sheets = Vec::with_capacity(config.sheets.len());

    for name in &config.sheets {
        let grid = wb
            .sheet(name)
            .ok_or_else(|| ReconError::MissingSheet(name.clone()))?;
        let (sheet_rows, stats) = extract_sheet(grid, config)?;
        log::debug!(
            "sheet '{}': data from row {}, kept {}, totals {}, blank {}, non-numeric {}",
            stats.sheet,
            stats.data_start,
            stats.kept,
            stats.skipped_totals,
            stats.skipped_blank,
            stats.skipped_non_numeric,
        );
        rows.extend(sheet_rows);
        sheets.push(stats);
    }

    Ok(Extraction {
        dataset: ReportDataset::new("source", rows),
        sheets,
    })
}

/// Find the reference and asset header cells, scanning row-major.
///
/// Matching is case-insensitive equality on trimmed text, so "Assets" or
/// "Asset Value" never match "Asset". The first hit for each role wins.
pub fn locate_columns(grid: &Grid, config: &ExtractConfig) -> Result<ColumnIndices, ReconError> {
    let want_ref = config.reference_header.trim().to_lowercase();
    let want_asset = config.asset_header.trim().to_lowercase();

    let mut reference: Option<(usize, usize)> = None;
    let mut asset: Option<(usize, usize)> = None;

    for (row_idx, row) in grid.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let Cell::Text(s) = cell else { continue };
            let label = s.trim().to_lowercase();
            if reference.is_none() && label == want_ref {
                reference = Some((row_idx, col_idx));
            } else if asset.is_none() && label == want_asset {
                asset = Some((row_idx, col_idx));
            }
        }
        if reference.is_some() && asset.is_some() {
            break;
        }
    }

    let missing = |header: &str| ReconError::MissingHeader {
        sheet: grid.name.clone(),
        header: header.to_string(),
    };
    let (ref_row, ref_col) = reference.ok_or_else(|| missing(&config.reference_header))?;
    let (asset_row, asset_col) = asset.ok_or_else(|| missing(&config.asset_header))?;

    Ok(ColumnIndices {
        header_row: ref_row.max(asset_row),
        reference: ref_col,
        asset: asset_col,
    })
}

/// First row at or below the headers where both columns are numeric.
pub fn find_data_start(grid: &Grid, cols: &ColumnIndices) -> Result<usize, ReconError> {
    (cols.header_row..grid.height())
        .find(|&r| {
            grid.get(r, cols.reference).as_number().is_some()
                && grid.get(r, cols.asset).as_number().is_some()
        })
        .ok_or_else(|| ReconError::NoDataRows { sheet: grid.name.clone() })
}

/// Label of a row: display text of its first non-empty cell.
pub fn row_label(row: &[Cell]) -> String {
    row.iter()
        .find(|c| !c.is_empty())
        .map(Cell::display)
        .unwrap_or_default()
}

/// Whether a label names a total line that must be dropped.
pub fn is_excluded_total(label: &str, config: &ExtractConfig) -> bool {
    let exempt = !config.total_exception.is_empty() && label.contains(&config.total_exception);
    label.contains(&config.total_token) && !exempt
}

pub fn extract_sheet(
    grid: &Grid,
    config: &ExtractConfig,
) -> Result<(Vec<ReportRow>, SheetStats), ReconError> {
    let cols = locate_columns(grid, config)?;
    let data_start = find_data_start(grid, &cols)?;

    let mut stats = SheetStats {
        sheet: grid.name.clone(),
        data_start,
        ..Default::default()
    };
    let mut rows = Vec::new();

    for r in data_start..grid.height() {
        let ref_cell = grid.get(r, cols.reference);
        let asset_cell = grid.get(r, cols.asset);

        if ref_cell.is_empty() && asset_cell.is_empty() {
            stats.skipped_blank += 1;
            continue;
        }

        if is_excluded_total(&row_label(&grid.rows[r]), config) {
            stats.skipped_totals += 1;
            continue;
        }

        let (Some(reference), Some(asset)) = (value_or_zero(ref_cell), value_or_zero(asset_cell))
        else {
            stats.skipped_non_numeric += 1;
            continue;
        };

        rows.push(ReportRow::new(
            normalize(reference, config.precision),
            normalize(asset, config.precision),
        ));
        stats.kept += 1;
    }

    Ok((rows, stats))
}

/// Empty cells count as zero; present but non-numeric cells yield `None`.
fn value_or_zero(cell: &Cell) -> Option<f64> {
    if cell.is_empty() {
        Some(0.0)
    } else {
        cell.as_number()
    }
}
