// pnlcheck CLI - validate Daily Hedging P&L tables against their source reports

mod config;
mod exit_codes;
mod history;
mod validate;

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pnlcheck_recon::ReconConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

/// Environment variable holding the diagnostics filter (e.g. `debug`, `pnlcheck_recon=trace`).
const LOG_ENV: &str = "PNLCHECK_LOG";

#[derive(Parser)]
#[command(name = "pnlcheck")]
#[command(about = "Validate machine-generated P&L tables against their source reports")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Print debug diagnostics to stderr (overrides PNLCHECK_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one output table against its source (exit 0 = correct, exit 1 = wrong)
    #[command(after_help = "\
Every run appends one line to the audit log, including runs whose inputs
could not be read. Exit code 5 means the audit line itself could not be written.

Examples:
  pnlcheck validate 'Daily Hedging P&L WB 2024_03_22.xlsx' --output table.csv
  pnlcheck validate report.xlsx -o table.csv --mode fuzzy --json
  pnlcheck validate docint.csv -o table.csv --name 'Daily Hedging P&L WB 2024_03_22.msg'
  pnlcheck validate report.xlsx -o table.csv --config recon.toml --log /var/log/pnl.txt")]
    Validate(validate::ValidateArgs),

    /// Inspect the audit log
    Log {
        #[command(subcommand)]
        command: history::LogCommands,
    },

    /// Check or print reconciliation settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  pnlcheck-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  pnlcheck-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // `log` records from the library crates are forwarded by the subscriber's log bridge
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        None => Err(CliError::args("no command given").with_hint("run pnlcheck --help")),
        Some(Commands::Validate(args)) => validate::cmd_validate(args),
        Some(Commands::Log { command }) => history::cmd_log(command),
        Some(Commands::Config { command }) => config::cmd_config(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Exit with `code` without printing anything further.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Load settings from `path`, or the built-in defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text).map_err(|e| {
        CliError::config(format!("{}: {e}", path.display()))
            .with_hint("run `pnlcheck config defaults` for a complete example")
    })?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
