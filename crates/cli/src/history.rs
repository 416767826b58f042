//! `pnlcheck log` - read back the audit log.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use pnlcheck_io::{AuditLog, AuditSummary};
use pnlcheck_recon::Verdict;

use crate::{load_config, CliError};

#[derive(Subcommand)]
pub enum LogCommands {
    /// Count verdicts and show the latest verdict per file
    #[command(after_help = "\
Examples:
  pnlcheck log summary
  pnlcheck log summary --log /var/log/pnl.txt --json
  pnlcheck log summary --status wrong        # one file name per line")]
    Summary {
        /// Audit log path (overrides audit.log_path)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Settings file used to locate the log
        #[arg(long, env = "PNLCHECK_CONFIG")]
        config: Option<PathBuf>,

        /// Only list files whose latest verdict is this
        #[arg(long)]
        status: Option<StatusArg>,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Correct,
    Wrong,
}

impl From<StatusArg> for Verdict {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Correct => Verdict::Correct,
            StatusArg::Wrong => Verdict::Wrong,
        }
    }
}

#[derive(Serialize)]
struct StatusListing<'a> {
    status: Verdict,
    files: Vec<&'a str>,
}

pub fn cmd_log(cmd: LogCommands) -> Result<(), CliError> {
    match cmd {
        LogCommands::Summary { log, config, status, json } => {
            cmd_log_summary(log, config, status, json)
        }
    }
}

fn cmd_log_summary(
    log: Option<PathBuf>,
    config: Option<PathBuf>,
    status: Option<StatusArg>,
    json_output: bool,
) -> Result<(), CliError> {
    let path = match log {
        Some(p) => p,
        None => load_config(config.as_deref())?.audit.log_path,
    };
    let audit = AuditLog::new(path);
    let summary = audit.summary().map_err(|e| {
        CliError::io(format!("cannot read audit log {}: {e}", audit.path().display()))
    })?;

    match (status, json_output) {
        (Some(status), true) => {
            let listing = StatusListing {
                status: status.into(),
                files: summary.files_with(status.into()),
            };
            print_json(&listing)
        }
        (Some(status), false) => {
            for name in summary.files_with(status.into()) {
                println!("{name}");
            }
            Ok(())
        }
        (None, true) => print_json(&summary),
        (None, false) => {
            print!("{}", render_summary(&summary));
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

fn render_summary(summary: &AuditSummary) -> String {
    let mut out = format!(
        "{} attempts: {} correct, {} wrong ({} files)\n",
        summary.total,
        summary.correct,
        summary.wrong,
        summary.latest.len()
    );
    let width = summary.latest.values().map(|v| v.as_str().len()).max().unwrap_or(0);
    for (name, verdict) in &summary.latest {
        out.push_str(&format!("  {:<width$}  {name}\n", verdict.as_str()));
    }
    out
}
