use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty sheet list, bad threshold, etc.).
    ConfigValidation(String),
    /// A configured sheet is not present in the workbook.
    MissingSheet(String),
    /// Header label not found anywhere in a sheet.
    MissingHeader { sheet: String, header: String },
    /// Columns were located but no row below them holds two numbers.
    NoDataRows { sheet: String },
    /// Required column missing from a tabular input.
    MissingColumn { table: String, column: String },
    /// Cell in a tabular input is not a number.
    ValueParse { table: String, row: usize, column: String, value: String },
    /// NaN or infinity reached the comparator.
    NonFiniteValue { table: String, row: usize },
    /// Both datasets are empty; there is nothing to reconcile.
    EmptyDataset,
    /// Source file kind cannot be extracted.
    UnsupportedSource(String),
    /// Workbook could not be opened or a sheet could not be read.
    Workbook(String),
    /// IO error (file read, etc.).
    Io(String),
}

/// Coarse grouping used in results and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Extraction,
    Comparison,
    Io,
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::Comparison => write!(f, "comparison"),
            Self::Io => write!(f, "io"),
            Self::Config => write!(f, "config"),
        }
    }
}

impl ReconError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigParse(_) | Self::ConfigValidation(_) => ErrorCategory::Config,
            Self::MissingSheet(_)
            | Self::MissingHeader { .. }
            | Self::NoDataRows { .. }
            | Self::UnsupportedSource(_) => ErrorCategory::Extraction,
            Self::MissingColumn { .. }
            | Self::ValueParse { .. }
            | Self::NonFiniteValue { .. }
            | Self::EmptyDataset => ErrorCategory::Comparison,
            Self::Workbook(_) | Self::Io(_) => ErrorCategory::Io,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingSheet(sheet) => write!(f, "workbook has no sheet '{sheet}'"),
            Self::MissingHeader { sheet, header } => {
                write!(f, "sheet '{sheet}': could not find '{header}' column header")
            }
            Self::NoDataRows { sheet } => {
                write!(f, "sheet '{sheet}': could not find data rows below the column headers")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::ValueParse { table, row, column, value } => {
                write!(
                    f,
                    "table '{table}', row {row}, column '{column}': cannot parse number '{value}'"
                )
            }
            Self::NonFiniteValue { table, row } => {
                write!(f, "table '{table}', row {row}: value is not finite")
            }
            Self::EmptyDataset => write!(f, "both datasets are empty"),
            Self::UnsupportedSource(what) => write!(f, "unsupported source: {what}"),
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<std::io::Error> for ReconError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let missing = ReconError::MissingHeader { sheet: "WB".into(), header: "Asset".into() };
        assert_eq!(missing.category(), ErrorCategory::Extraction);
        assert_eq!(ReconError::EmptyDataset.category(), ErrorCategory::Comparison);
        assert_eq!(ReconError::Io("x".into()).category(), ErrorCategory::Io);
        assert_eq!(ReconError::ConfigParse("x".into()).category(), ErrorCategory::Config);
    }

    #[test]
    fn display_names_sheet_and_header() {
        let e = ReconError::MissingHeader { sheet: "DBIB".into(), header: "Liability".into() };
        assert_eq!(e.to_string(), "sheet 'DBIB': could not find 'Liability' column header");
    }
}
