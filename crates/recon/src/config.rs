use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Largest `precision` accepted; beyond this f64 stops carrying the digits.
pub const MAX_PRECISION: u32 = 12;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub tables: TableConfig,
    #[serde(default)]
    pub fuzzy: FuzzyConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Sheets read from a spreadsheet source, in processing order.
    pub sheets: Vec<String>,
    pub reference_header: String,
    pub asset_header: String,
    /// Rows whose label contains this token are dropped...
    pub total_token: String,
    /// ...unless the label also contains this phrase. Empty means no exception.
    pub total_exception: String,
    /// Fractional digits kept after rounding.
    pub precision: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sheets: vec!["WB".into(), "DBIB".into()],
            reference_header: "Liability".into(),
            asset_header: "Asset".into(),
            total_token: "Total".into(),
            total_exception: "HY Total".into(),
            precision: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular column names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Machine-generated output table.
    pub output_reference_column: String,
    pub output_asset_column: String,
    /// Pre-extracted source table.
    pub source_reference_column: String,
    pub source_asset_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            output_reference_column: "RIDER_VALUE".into(),
            output_asset_column: "ASSET_VALUE".into(),
            source_reference_column: "Liability".into(),
            source_asset_column: "Asset".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fuzzy matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Per-field absolute difference that still counts as equal (exclusive).
    pub tolerance: f64,
    /// Minimum share of matching rows, in percent, for a fuzzy pass.
    pub threshold_percent: f64,
    /// Row-count difference above which fuzzy matching is abandoned.
    pub max_row_diff: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            threshold_percent: 80.0,
            max_row_diff: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("log/validation_log.txt"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let invalid = |msg: String| Err(ReconError::ConfigValidation(msg));
        let ex = &self.extract;

        if ex.sheets.is_empty() {
            return invalid("extract.sheets must name at least one sheet".into());
        }
        let mut seen = HashSet::new();
        for sheet in &ex.sheets {
            if sheet.trim().is_empty() {
                return invalid("extract.sheets contains an empty name".into());
            }
            if !seen.insert(sheet.as_str()) {
                return invalid(format!("extract.sheets lists '{sheet}' twice"));
            }
        }

        if ex.reference_header.trim().is_empty() || ex.asset_header.trim().is_empty() {
            return invalid("extract header labels must not be empty".into());
        }
        if ex.reference_header.trim().eq_ignore_ascii_case(ex.asset_header.trim()) {
            return invalid(format!(
                "reference and asset headers are both '{}'",
                ex.asset_header
            ));
        }
        if ex.total_token.is_empty() {
            return invalid("extract.total_token must not be empty".into());
        }
        if ex.precision > MAX_PRECISION {
            return invalid(format!(
                "extract.precision must be at most {MAX_PRECISION}, got {}",
                ex.precision
            ));
        }

        let t = &self.tables;
        for (key, name) in [
            ("output_reference_column", &t.output_reference_column),
            ("output_asset_column", &t.output_asset_column),
            ("source_reference_column", &t.source_reference_column),
            ("source_asset_column", &t.source_asset_column),
        ] {
            if name.trim().is_empty() {
                return invalid(format!("tables.{key} must not be empty"));
            }
        }

        let fz = &self.fuzzy;
        if !fz.tolerance.is_finite() || fz.tolerance < 0.0 {
            return invalid(format!(
                "fuzzy.tolerance must be a non-negative number, got {}",
                fz.tolerance
            ));
        }
        if !(fz.threshold_percent > 0.0 && fz.threshold_percent <= 100.0) {
            return invalid(format!(
                "fuzzy.threshold_percent must be in (0, 100], got {}",
                fz.threshold_percent
            ));
        }

        if self.audit.log_path.as_os_str().is_empty() {
            return invalid("audit.log_path must not be empty".into());
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
