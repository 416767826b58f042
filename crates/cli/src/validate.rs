//! `pnlcheck validate` - one source, one output table, one audit line.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde::Serialize;

use pnlcheck_io::{validate_file, AuditLog, ValidationRequest};
use pnlcheck_recon::model::{CompareMode, ComparisonResult, SourceKind};
use pnlcheck_recon::{ReconConfig, Verdict};

use crate::exit_codes::{EXIT_AUDIT_WRITE, EXIT_WRONG};
use crate::{load_config, CliError};

/// Mismatched rows printed in the human summary before eliding the rest.
const MAX_LISTED_MISMATCHES: usize = 5;

#[derive(Args)]
pub struct ValidateArgs {
    /// Source document: WB/DBIB workbook or pre-extracted CSV table
    pub source: PathBuf,

    /// Machine-generated CSV table to validate
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Source kind (inferred from the extension if not specified)
    #[arg(long)]
    pub kind: Option<KindArg>,

    /// Comparison mode; auto = exact for workbooks, fuzzy for tables
    #[arg(long, default_value = "auto")]
    pub mode: ModeArg,

    /// Settings file (TOML); built-in defaults when omitted
    #[arg(long, env = "PNLCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Audit log path (overrides audit.log_path)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Name recorded in the audit log (defaults to the source file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Spreadsheet,
    Table,
}

impl From<KindArg> for SourceKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Spreadsheet => SourceKind::Spreadsheet,
            KindArg::Table => SourceKind::Table,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Auto,
    Exact,
    Fuzzy,
}

impl From<ModeArg> for CompareMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Auto => CompareMode::Auto,
            ModeArg::Exact => CompareMode::Exact,
            ModeArg::Fuzzy => CompareMode::Fuzzy,
        }
    }
}

/// `--json` document.
#[derive(Serialize)]
struct ValidateReport<'a> {
    file: &'a str,
    verdict: Verdict,
    log: &'a Path,
    result: &'a ComparisonResult,
}

pub fn cmd_validate(args: ValidateArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let log_path = args.log.unwrap_or_else(|| config.audit.log_path.clone());
    let mut audit = AuditLog::new(log_path);

    let request = ValidationRequest {
        source: args.source,
        output: args.output,
        kind: args.kind.map(SourceKind::from),
        mode: args.mode.into(),
        name: args.name,
    };
    let file_name = request.audit_name();

    let result = validate_file(&request, &config, &mut audit).map_err(|e| CliError {
        code: EXIT_AUDIT_WRITE,
        message: format!("cannot append to audit log {}: {e}", audit.path().display()),
        hint: Some("no verdict was recorded for this attempt".into()),
    })?;
    let verdict = result.verdict();

    if args.json {
        let report = ValidateReport {
            file: &file_name,
            verdict,
            log: audit.path(),
            result: &result,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    eprint!("{}", render_summary(&file_name, &result, &config));

    match verdict {
        Verdict::Correct => Ok(()),
        Verdict::Wrong => Err(CliError::silent(EXIT_WRONG)),
    }
}

/// Human summary written to stderr.
fn render_summary(file_name: &str, result: &ComparisonResult, config: &ReconConfig) -> String {
    let mut out = format!("{file_name}: {}\n", result.verdict());

    if let Some(err) = &result.error {
        out.push_str(&format!("  error:   [{}] {}\n", err.category, err.message));
        return out;
    }

    if let Some(branch) = result.branch {
        out.push_str(&format!("  mode:    {branch}\n"));
    }
    out.push_str(&format!(
        "  rows:    {} source, {} output\n",
        result.rows_source, result.rows_output
    ));
    for sheet in &result.sheets {
        out.push_str(&format!(
            "    {}: {} kept, {} totals, {} blank, {} non-numeric skipped\n",
            sheet.sheet,
            sheet.kept,
            sheet.skipped_totals,
            sheet.skipped_blank,
            sheet.skipped_non_numeric,
        ));
    }

    match (&result.fuzzy, result.branch) {
        (Some(stats), Some(branch)) if !branch.uses_digest() => {
            out.push_str(&format!(
                "  fuzzy:   {}/{} rows within {} ({:.2}%, need {}%)\n",
                stats.matching_rows,
                stats.compared_rows,
                config.fuzzy.tolerance,
                stats.match_percentage,
                config.fuzzy.threshold_percent,
            ));
            for m in stats.mismatches.iter().take(MAX_LISTED_MISMATCHES) {
                out.push_str(&format!(
                    "    row {}: source ({}, {}) output ({}, {})\n",
                    m.index + 1,
                    m.source.reference,
                    m.source.asset,
                    m.output.reference,
                    m.output.asset,
                ));
            }
            if stats.mismatches.len() > MAX_LISTED_MISMATCHES {
                out.push_str(&format!(
                    "    ... {} more\n",
                    stats.mismatches.len() - MAX_LISTED_MISMATCHES
                ));
            }
        }
        _ => {
            if let (Some(a), Some(b)) = (&result.canonical_digest_a, &result.canonical_digest_b) {
                out.push_str(&format!("  digests: {} vs {}\n", short_digest(a), short_digest(b)));
            }
        }
    }

    out.push_str(&format!("  elapsed: {:.1} ms\n", result.elapsed_ms));
    out
}

fn short_digest(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
