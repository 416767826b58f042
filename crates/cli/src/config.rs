//! `pnlcheck config` - validate or print reconciliation settings.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use pnlcheck_recon::ReconConfig;

use crate::{load_config, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a settings file without running anything
    #[command(after_help = "\
Examples:
  pnlcheck config check recon.toml")]
    Check {
        /// Path to the TOML settings file
        file: PathBuf,
    },

    /// Print the built-in settings as TOML
    #[command(after_help = "\
Examples:
  pnlcheck config defaults > recon.toml")]
    Defaults,
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Check { file } => cmd_config_check(&file),
        ConfigCommands::Defaults => cmd_config_defaults(),
    }
}

fn cmd_config_check(file: &Path) -> Result<(), CliError> {
    let config = load_config(Some(file))?;
    eprintln!("{}: ok", file.display());
    eprint!("{}", describe(&config));
    Ok(())
}

fn cmd_config_defaults() -> Result<(), CliError> {
    let text = ReconConfig::default()
        .to_toml()
        .map_err(|e| CliError::config(e.to_string()))?;
    print!("{text}");
    Ok(())
}

fn describe(config: &ReconConfig) -> String {
    let ex = &config.extract;
    let fz = &config.fuzzy;
    format!(
        concat!(
            "  sheets:  {}\n",
            "  headers: '{}' / '{}' (precision {})\n",
            "  fuzzy:   tolerance {}, threshold {}%, max row diff {}\n",
            "  log:     {}\n",
        ),
        ex.sheets.join(", "),
        ex.reference_header,
        ex.asset_header,
        ex.precision,
        fz.tolerance,
        fz.threshold_percent,
        fz.max_row_diff,
        config.audit.log_path.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defaults() {
        let text = describe(&ReconConfig::default());
        assert!(text.contains("sheets:  WB, DBIB"), "{text}");
        assert!(text.contains("headers: 'Liability' / 'Asset' (precision 6)"), "{text}");
        assert!(text.contains("tolerance 0.001, threshold 80%, max row diff 2"), "{text}");
        assert!(text.contains("log/validation_log.txt"), "{text}");
    }
}
