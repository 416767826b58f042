// CSV table import

use std::io::Read;
use std::path::Path;

use pnlcheck_recon::model::{ReportDataset, ReportRow};
use pnlcheck_recon::ReconError;

/// Names of the two columns to pull out of a table.
#[derive(Debug, Clone, Copy)]
pub struct TableColumns<'a> {
    pub reference: &'a str,
    pub asset: &'a str,
}

/// Load a headed CSV table and read its two comparison columns.
pub fn load_table(
    path: &Path,
    name: &str,
    columns: TableColumns<'_>,
) -> Result<ReportDataset, ReconError> {
    let content = read_file_as_utf8(path)?;
    parse_table(&content, name, columns)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Parse CSV text with a header row into a dataset.
///
/// Both columns are required and every value must be a finite number.
pub fn parse_table(
    content: &str,
    name: &str,
    columns: TableColumns<'_>,
) -> Result<ReportDataset, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(format!("table '{name}': {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |column: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == column).ok_or_else(|| ReconError::MissingColumn {
            table: name.into(),
            column: column.into(),
        })
    };
    let ref_idx = idx(columns.reference)?;
    let asset_idx = idx(columns.asset)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ReconError::Io(format!("table '{name}': {e}")))?;
        // 1-based file line; header is line 1
        let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);

        let number = |col_idx: usize, column: &str| -> Result<f64, ReconError> {
            let raw = record.get(col_idx).unwrap_or("").trim();
            let value = raw.parse::<f64>().map_err(|_| ReconError::ValueParse {
                table: name.into(),
                row: line,
                column: column.into(),
                value: raw.into(),
            })?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ReconError::NonFiniteValue { table: name.into(), row: line })
            }
        };

        rows.push(ReportRow::new(
            number(ref_idx, columns.reference)?,
            number(asset_idx, columns.asset)?,
        ));
    }

    Ok(ReportDataset::new(name, rows))
}
