// Excel import (xlsx, xls, xlsb, ods) into plain cell grids

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use pnlcheck_recon::grid::{Cell, Grid, Workbook};
use pnlcheck_recon::ReconError;

/// Read only the named sheets, in the order given.
///
/// A name missing from the file is an error; extraction would fail on it anyway.
pub fn import_only(path: &Path, names: &[String]) -> Result<Workbook, ReconError> {
    let start_time = Instant::now();

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ReconError::Workbook(format!("failed to open {}: {e}", path.display())))?;

    let available: Vec<String> = workbook.sheet_names().to_vec();
    if available.is_empty() {
        return Err(ReconError::Workbook(format!("{} contains no sheets", path.display())));
    }
    if let Some(missing) = names.iter().find(|n| !available.contains(n)) {
        return Err(ReconError::MissingSheet(missing.clone()));
    }

    let mut sheets = Vec::with_capacity(names.len());
    for sheet_name in names {
        let range = workbook.worksheet_range(sheet_name).map_err(|e| {
            ReconError::Workbook(format!("failed to read sheet '{sheet_name}': {e}"))
        })?;

        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            sheets.push(Grid::new(sheet_name.clone(), Vec::new()));
            continue;
        }

        // Range start offset (data may not begin at A1)
        let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); data_start_row as usize];

        for row in range.rows() {
            let mut cells = vec![Cell::Empty; data_start_col as usize];
            cells.extend(row.iter().map(convert_cell));
            rows.push(cells);
        }

        sheets.push(Grid::new(sheet_name.clone(), rows));
    }

    log::debug!(
        "imported {} sheet(s) from {} in {} ms",
        sheets.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );

    Ok(Workbook::new(sheets))
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // Date-times keep their serial value
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
